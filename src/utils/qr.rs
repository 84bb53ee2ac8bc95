use crate::error::{AppError, AppResult};
use image::{ImageFormat, Luma};
use qrcode::{EcLevel, QrCode};
use std::io::Cursor;

const QR_MIN_SIZE: u32 = 300;

/// Renders `content` as a PNG QR code (high error correction, with quiet zone)
pub fn render_qr_png(content: &str) -> AppResult<Vec<u8>> {
    let code = QrCode::with_error_correction_level(content.as_bytes(), EcLevel::H)
        .map_err(|e| AppError::InternalError(format!("QR encoding failed: {e}")))?;

    let img = code
        .render::<Luma<u8>>()
        .min_dimensions(QR_MIN_SIZE, QR_MIN_SIZE)
        .quiet_zone(true)
        .build();

    let mut png = Vec::new();
    img.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
        .map_err(|e| AppError::InternalError(format!("PNG encoding failed: {e}")))?;
    Ok(png)
}
