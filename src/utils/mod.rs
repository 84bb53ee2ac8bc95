pub mod elapsed;
pub mod payload;
pub mod qr;
pub mod youtube;

pub use elapsed::{Elapsed, parse_start, script_start};
pub use payload::{MAX_PAYLOAD_BYTES, cap_payload};
pub use qr::render_qr_png;
pub use youtube::youtube_video_id;
