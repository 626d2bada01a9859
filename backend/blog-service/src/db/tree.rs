//! Materialized-path helpers for the page tree.
//!
//! Every level adds a fixed-width segment, so a page's descendants are the
//! rows whose path starts with its own and whose depth is greater.

pub const STEP_LEN: usize = 4;
const ALPHABET: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

fn decode_segment(segment: &str) -> Option<u64> {
    segment.chars().try_fold(0u64, |acc, ch| {
        ch.to_digit(36).map(|digit| acc * 36 + u64::from(digit))
    })
}

fn encode_segment(mut value: u64) -> Option<String> {
    let capacity = 36u64.pow(STEP_LEN as u32);
    if value >= capacity {
        return None;
    }
    let mut out = [b'0'; STEP_LEN];
    for slot in out.iter_mut().rev() {
        *slot = ALPHABET[(value % 36) as usize];
        value /= 36;
    }
    Some(out.iter().map(|&b| b as char).collect())
}

/// Path for the next child of `parent_path`, given the greatest existing
/// child path (if any). Returns `None` when the level is full or the stored
/// path is malformed.
pub fn next_child_path(parent_path: &str, last_child: Option<&str>) -> Option<String> {
    let next = match last_child {
        None => 1,
        Some(path) => {
            let segment = path.get(parent_path.len()..)?;
            if segment.len() != STEP_LEN {
                return None;
            }
            decode_segment(segment)? + 1
        }
    };
    Some(format!("{}{}", parent_path, encode_segment(next)?))
}

pub fn depth_of(path: &str) -> i32 {
    (path.len() / STEP_LEN) as i32
}
