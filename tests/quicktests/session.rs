use ordered_index::{Command, DuplicatePolicy, Error, Reply, Session, SessionConfig};

use std::collections::BTreeMap;

use crate::Op;

fn session(policy: DuplicatePolicy) -> Session<u8, u16> {
    Session::new(SessionConfig {
        duplicate_policy: policy,
        default_index: Some("fuzz".to_string()),
    })
}

#[quickcheck]
fn reject_policy_matches_first_write_wins(ops: Vec<Op<u8, u16>>) -> bool {
    let mut session = session(DuplicatePolicy::Reject);
    let mut map = BTreeMap::new();

    for op in ops {
        let agrees = match op {
            Op::Insert(k, v) => {
                let result = session.execute(Command::Insert(k, v));
                if map.contains_key(&k) {
                    matches!(result, Err(Error::KeyAlreadyExists { .. }))
                } else {
                    map.insert(k, v);
                    result == Ok(Reply::Inserted)
                }
            }
            Op::Remove(k) => match map.remove(&k) {
                Some(v) => session.execute(Command::Delete(k)) == Ok(Reply::Deleted(v)),
                None => matches!(
                    session.execute(Command::Delete(k)),
                    Err(Error::KeyNotFound { .. })
                ),
            },
        };
        if !agrees {
            return false;
        }
    }

    session.execute(Command::List) == Ok(Reply::Listing(map.into_iter().collect()))
}

#[quickcheck]
fn overwrite_policy_matches_last_write_wins(ops: Vec<Op<u8, u16>>) -> bool {
    let mut session = session(DuplicatePolicy::Overwrite);
    let mut map = BTreeMap::new();

    for op in ops {
        match op {
            Op::Insert(k, v) => {
                let expected = match map.insert(k, v) {
                    Some(previous) => Reply::Replaced(previous),
                    None => Reply::Inserted,
                };
                if session.execute(Command::Insert(k, v)) != Ok(expected) {
                    return false;
                }
            }
            Op::Remove(k) => {
                if session.delete(&k).ok() != map.remove(&k) {
                    return false;
                }
            }
        }
    }

    session.stats().total == map.len()
        && session.execute(Command::List) == Ok(Reply::Listing(map.into_iter().collect()))
}
