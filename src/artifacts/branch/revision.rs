use crate::areas::database::Database;
use crate::areas::refs::{HEAD_REF_NAME, Refs};
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::branch::{ANCESTOR_REGEX, PARENT_REGEX, REF_ALIASES};
use crate::artifacts::objects::MIN_PREFIX_LENGTH;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::errors::{Error, Result};

/// A revision expression naming a commit
///
/// Supported forms:
/// - `HEAD` or its alias `@`
/// - Branch names: `master`, `feature/login`
/// - Full or abbreviated object ids (at least 4 hex characters), tried when no branch of
///   that name exists
/// - Parent notation: `<revision>^`
/// - Ancestor notation: `<revision>~<n>` (first parents only)
///
/// ```ignore
/// let oid = Revision::try_parse("topic~2")?.resolve(&refs, &database)?;
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Revision {
    /// HEAD, a branch, or possibly an object id (decided during resolution)
    Ref(BranchName),
    /// The Nth first-parent ancestor of a revision
    Ancestor(Box<Revision>, usize),
    /// The first parent of a revision
    Parent(Box<Revision>),
}

impl Revision {
    pub fn try_parse(revision: &str) -> Result<Revision> {
        let parent_re = compile(PARENT_REGEX, revision)?;
        let ancestor_re = compile(ANCESTOR_REGEX, revision)?;

        if let Some(caps) = parent_re.captures(revision) {
            let base_revision = Self::try_parse(&caps[1])?;

            Ok(Revision::Parent(Box::new(base_revision)))
        } else if let Some(caps) = ancestor_re.captures(revision) {
            let generations = caps[2].parse().map_err(|_| Error::InvalidRevision {
                revision: revision.to_string(),
                reason: "generation count out of range".to_string(),
            })?;
            let base_revision = Self::try_parse(&caps[1])?;

            Ok(Revision::Ancestor(Box::new(base_revision), generations))
        } else {
            let resolved_name = *REF_ALIASES.get(revision).unwrap_or(&revision);

            Ok(Revision::Ref(BranchName::try_parse(resolved_name)?))
        }
    }

    /// Resolve to the id of a stored commit
    pub fn resolve(&self, refs: &Refs, database: &Database) -> Result<ObjectId> {
        match self {
            Revision::Ref(name) if name.as_ref() == HEAD_REF_NAME => refs.resolve_head(database),
            Revision::Ref(name) => {
                if refs.branch_exists(name) {
                    let oid = refs.read_branch(name)?.ok_or_else(|| {
                        Error::dangling_ref(name.ref_path(), "branch file is empty")
                    })?;
                    Self::validate_oid_is_commit(&oid, database)?;

                    Ok(oid)
                } else if Self::looks_like_oid(name.as_ref()) {
                    Self::resolve_oid(name.as_ref(), database)
                } else {
                    Err(Error::RevisionNotFound {
                        revision: name.to_string(),
                    })
                }
            }
            Revision::Parent(base_revision) => {
                let oid = base_revision.resolve(refs, database)?;
                Self::first_parent(&oid, database)?.ok_or_else(|| Error::RevisionNotFound {
                    revision: self.to_string(),
                })
            }
            Revision::Ancestor(base_revision, generations) => {
                let mut oid = base_revision.resolve(refs, database)?;
                for _ in 0..*generations {
                    oid = Self::first_parent(&oid, database)?.ok_or_else(|| {
                        Error::RevisionNotFound {
                            revision: self.to_string(),
                        }
                    })?;
                }

                Ok(oid)
            }
        }
    }

    /// Branch named by this revision, if it is a plain branch reference
    pub fn as_branch(&self, refs: &Refs) -> Option<&BranchName> {
        match self {
            Revision::Ref(name) if name.as_ref() != HEAD_REF_NAME && refs.branch_exists(name) => {
                Some(name)
            }
            _ => None,
        }
    }

    fn first_parent(oid: &ObjectId, database: &Database) -> Result<Option<ObjectId>> {
        Ok(database.load_slim_commit(oid)?.parents.into_iter().next())
    }

    fn resolve_oid(oid_str: &str, database: &Database) -> Result<ObjectId> {
        if oid_str.len() == database.hasher().hex_len() {
            let oid = ObjectId::try_parse(oid_str)?;
            Self::validate_oid_is_commit(&oid, database)?;
            return Ok(oid);
        }

        let commit_matches = database
            .find_objects_by_prefix(oid_str)?
            .into_iter()
            .filter(|oid| matches!(database.object_type(oid), Ok(ObjectType::Commit)))
            .collect::<Vec<_>>();

        match commit_matches.as_slice() {
            [] => Err(Error::RevisionNotFound {
                revision: oid_str.to_string(),
            }),
            [oid] => Ok(oid.clone()),
            candidates => Err(Error::AmbiguousObjectId {
                prefix: oid_str.to_string(),
                candidates: candidates.iter().map(ObjectId::to_short_oid).collect(),
            }),
        }
    }

    fn validate_oid_is_commit(oid: &ObjectId, database: &Database) -> Result<()> {
        let obj_type = database.object_type(oid)?;

        if obj_type != ObjectType::Commit {
            return Err(Error::UnexpectedObjectType {
                oid: oid.to_string(),
                expected: ObjectType::Commit.to_string(),
                actual: obj_type.to_string(),
            });
        }

        Ok(())
    }

    fn looks_like_oid(s: &str) -> bool {
        s.len() >= MIN_PREFIX_LENGTH && s.chars().all(|c| c.is_ascii_hexdigit())
    }
}

impl std::fmt::Display for Revision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Revision::Ref(name) => write!(f, "{name}"),
            Revision::Parent(base) => write!(f, "{base}^"),
            Revision::Ancestor(base, generations) => write!(f, "{base}~{generations}"),
        }
    }
}

fn compile(pattern: &str, revision: &str) -> Result<regex::Regex> {
    regex::Regex::new(pattern).map_err(|e| Error::InvalidRevision {
        revision: revision.to_string(),
        reason: e.to_string(),
    })
}
