/// Upper bound for a single stored payload (one image, or the video link)
pub const MAX_PAYLOAD_BYTES: usize = 1_000_000;

/// Truncates `value` to at most `max_bytes`, backing off to a char boundary.
/// No re-encoding happens; an oversized image is simply cut.
pub fn cap_payload(mut value: String, max_bytes: usize) -> String {
    if value.len() <= max_bytes {
        return value;
    }
    let mut end = max_bytes;
    while end > 0 && !value.is_char_boundary(end) {
        end -= 1;
    }
    value.truncate(end);
    value
}
