//! Small byte and string helpers shared by the extractor and the archive code.

use std::cmp::Ordering;

/// Find every non-overlapping occurrence of `needle` in `haystack`.
///
/// Returns the start offsets in ascending order. After a match the scan
/// resumes past the matched bytes, so a needle can never be reported twice
/// for overlapping positions.
pub fn find_all(haystack: &[u8], needle: &[u8]) -> Vec<usize> {
    let mut offsets = Vec::new();
    if needle.is_empty() || haystack.len() < needle.len() {
        return offsets;
    }

    let first = needle[0];
    let last_start = haystack.len() - needle.len();
    let mut i = 0;

    while i <= last_start {
        if haystack[i] == first && haystack[i + 1..i + needle.len()] == needle[1..] {
            offsets.push(i);
            i += needle.len();
        } else {
            i += 1;
        }
    }

    offsets
}

/// Find the first occurrence of `needle` within the first `window` bytes of
/// `haystack`. A match must start inside the window but may end past it.
pub fn find_within(haystack: &[u8], needle: &[u8], window: usize) -> Option<usize> {
    if needle.is_empty() || window == 0 || haystack.len() < needle.len() {
        return None;
    }
    let last_start = (haystack.len() - needle.len()).min(window - 1);
    (0..=last_start).find(|&i| haystack[i..i + needle.len()] == *needle)
}

/// Compare two strings the way a human orders file names: runs of ASCII
/// digits compare by numeric value, everything else compares case-insensitively.
///
/// ```
/// use std::cmp::Ordering;
/// use mhtzip::util::natural_cmp;
///
/// assert_eq!(natural_cmp("page2", "page10"), Ordering::Less);
/// assert_eq!(natural_cmp("000012", "12"), Ordering::Greater);
/// ```
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    let (mut i, mut j) = (0, 0);

    while i < a.len() && j < b.len() {
        if a[i].is_ascii_digit() && b[j].is_ascii_digit() {
            let a_end = digit_run_end(a, i);
            let b_end = digit_run_end(b, j);
            let ord = cmp_digit_runs(&a[i..a_end], &b[j..b_end]);
            if ord != Ordering::Equal {
                return ord;
            }
            i = a_end;
            j = b_end;
        } else {
            let ord = a[i].to_ascii_lowercase().cmp(&b[j].to_ascii_lowercase());
            if ord != Ordering::Equal {
                return ord;
            }
            i += 1;
            j += 1;
        }
    }

    (a.len() - i).cmp(&(b.len() - j))
}

fn digit_run_end(s: &[u8], start: usize) -> usize {
    s[start..]
        .iter()
        .position(|c| !c.is_ascii_digit())
        .map_or(s.len(), |p| start + p)
}

// Leading zeros are ignored for the value; on a tie the longer run sorts last.
fn cmp_digit_runs(a: &[u8], b: &[u8]) -> Ordering {
    let a_trim = trim_leading_zeros(a);
    let b_trim = trim_leading_zeros(b);
    a_trim
        .len()
        .cmp(&b_trim.len())
        .then_with(|| a_trim.cmp(b_trim))
        .then_with(|| a.len().cmp(&b.len()))
}

fn trim_leading_zeros(s: &[u8]) -> &[u8] {
    let zeros = s.iter().take_while(|&&c| c == b'0').count();
    &s[zeros..]
}
