use crate::config::SummaryStyle;
use axum::extract::Multipart;

/// Parsed fields of the upload form.
pub struct UploadForm {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub style: SummaryStyle,
}

/// Parse a multipart upload with a `document` file field and an optional
/// `style` field.
pub async fn parse_multipart(mut multipart: Multipart) -> Result<UploadForm, String> {
    let mut file: Option<(String, Vec<u8>)> = None;
    let mut style = SummaryStyle::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| format!("Failed to read form field: {}", e))?
    {
        let name = field.name().unwrap_or("").to_string();

        match name.as_str() {
            "document" => {
                let file_name = field.file_name().unwrap_or("").to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| format!("Failed to read file data: {}", e))?
                    .to_vec();
                if !file_name.is_empty() {
                    file = Some((file_name, data));
                }
            }
            "style" => {
                let val = field
                    .text()
                    .await
                    .map_err(|e| format!("Failed to read style: {}", e))?;
                style = val.parse()?;
            }
            _ => {
                // Ignore unknown fields
                let _ = field.bytes().await;
            }
        }
    }

    let (file_name, bytes) = file.ok_or("No file uploaded")?;

    Ok(UploadForm {
        file_name,
        bytes,
        style,
    })
}
