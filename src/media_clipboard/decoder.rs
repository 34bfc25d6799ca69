//! # Data URI 解码模块
//!
//! ## 设计思路
//!
//! 纯转换：`data:<mime>;base64,<payload>` → 字节 + 推断扩展名，不触碰文件系统。
//! 落盘由编排层交给临时产物存储完成。
//!
//! ## 实现思路
//!
//! - 必须恰好包含一个 `;base64,` 标记，头部必须以 `data:` 开头。
//! - `image/*` 与缺省子类型走固定扩展名表，未知子类型一律 `jpg`；
//!   其他主类型（视频、音频、PDF 等）查静态 MIME 表，查不到同样回落 `jpg`。
//! - 载荷允许夹带空白与换行、允许缺省填充；解码结果为空视为错误。

use base64::Engine as _;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};

use crate::platform::StaticMimeTable;

use super::ClipboardError;

const BASE64_MARKER: &str = ";base64,";
const DEFAULT_EXTENSION: &str = "jpg";

/// 宽松的标准字母表引擎：填充可有可无。
const LENIENT_STANDARD: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

/// 解码结果。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedContent {
    pub bytes: Vec<u8>,
    /// 不带点的扩展名。
    pub extension: String,
    /// 头部声明的 MIME；`data:;base64,...` 时为 `None`。
    pub mime_type: Option<String>,
}

/// 解码一个 base64 Data URI。
pub fn decode_data_uri(data_uri: &str) -> Result<DecodedContent, ClipboardError> {
    let (header, payload) = data_uri
        .split_once(BASE64_MARKER)
        .ok_or_else(|| ClipboardError::InvalidBase64("缺少 ';base64,' 标记".to_string()))?;

    if payload.contains(BASE64_MARKER) {
        return Err(ClipboardError::InvalidBase64(
            "包含多个 ';base64,' 标记".to_string(),
        ));
    }

    let declared = header
        .strip_prefix("data:")
        .ok_or_else(|| ClipboardError::InvalidBase64("Data URI 必须以 'data:' 开头".to_string()))?;

    // 头部可能携带额外参数（如 `;charset=`），MIME 只取第一段
    let mime_type = declared
        .split(';')
        .next()
        .map(str::trim)
        .filter(|mime| !mime.is_empty())
        .map(str::to_ascii_lowercase);

    let bytes = decode_payload(payload)?;
    let extension = extension_for_mime_type(mime_type.as_deref()).to_string();

    log::debug!(
        "🧬 Data URI 解码完成 - MIME: {}, 扩展名: {}, {} 字节",
        mime_type.as_deref().unwrap_or("<未声明>"),
        extension,
        bytes.len()
    );

    Ok(DecodedContent {
        bytes,
        extension,
        mime_type,
    })
}

/// 解码载荷部分：去除空白后按标准字母表解码，空结果视为错误。
pub fn decode_payload(payload: &str) -> Result<Vec<u8>, ClipboardError> {
    let compact: String = payload.chars().filter(|c| !c.is_ascii_whitespace()).collect();

    let bytes = LENIENT_STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| ClipboardError::Base64Decode(e.to_string()))?;

    if bytes.is_empty() {
        return Err(ClipboardError::Base64Decode("解码结果为空".to_string()));
    }

    Ok(bytes)
}

/// 声明的 MIME → 扩展名。
pub fn extension_for_mime_type(mime_type: Option<&str>) -> &'static str {
    let Some(mime_type) = mime_type else {
        return DEFAULT_EXTENSION;
    };

    if let Some(subtype) = mime_type.strip_prefix("image/") {
        return match subtype {
            "png" => "png",
            "gif" => "gif",
            "webp" => "webp",
            "bmp" => "bmp",
            "jpeg" => "jpg",
            "svg+xml" => "svg",
            _ => DEFAULT_EXTENSION,
        };
    }

    StaticMimeTable::extension_for_mime_type(mime_type).unwrap_or(DEFAULT_EXTENSION)
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose;
    use proptest::prelude::*;

    const FIXED_TABLE: &[(&str, &str)] = &[
        ("png", "png"),
        ("gif", "gif"),
        ("webp", "webp"),
        ("bmp", "bmp"),
        ("jpeg", "jpg"),
        ("svg+xml", "svg"),
    ];

    #[test]
    fn decodes_png_data_uri() {
        let uri = format!(
            "data:image/png;base64,{}",
            general_purpose::STANDARD.encode(b"\x89PNG\r\n\x1a\nrest")
        );

        let decoded = decode_data_uri(&uri).expect("decode failed");

        assert_eq!(decoded.bytes, b"\x89PNG\r\n\x1a\nrest");
        assert_eq!(decoded.extension, "png");
        assert_eq!(decoded.mime_type.as_deref(), Some("image/png"));
    }

    #[test]
    fn empty_payload_is_a_decode_error() {
        assert!(matches!(
            decode_data_uri("data:image/png;base64,"),
            Err(ClipboardError::Base64Decode(_))
        ));
    }

    #[test]
    fn shape_errors_are_invalid_base64() {
        assert!(matches!(
            decode_data_uri("data:image/png,AAAA"),
            Err(ClipboardError::InvalidBase64(_))
        ));
        assert!(matches!(
            decode_data_uri("image/png;base64,AAAA"),
            Err(ClipboardError::InvalidBase64(_))
        ));
        assert!(matches!(
            decode_data_uri("data:image/png;base64,AAAA;base64,BBBB"),
            Err(ClipboardError::InvalidBase64(_))
        ));
    }

    #[test]
    fn garbage_payload_is_a_decode_error() {
        assert!(matches!(
            decode_data_uri("data:image/png;base64,@@@@"),
            Err(ClipboardError::Base64Decode(_))
        ));
    }

    #[test]
    fn tolerates_line_breaks_and_missing_padding() {
        let decoded = decode_data_uri("data:image/gif;base64,aGVs\nbG8").expect("decode failed");
        assert_eq!(decoded.bytes, b"hello");
        assert_eq!(decoded.extension, "gif");
    }

    #[test]
    fn non_image_mime_uses_mime_table() {
        assert_eq!(extension_for_mime_type(Some("video/mp4")), "mp4");
        assert_eq!(extension_for_mime_type(Some("application/pdf")), "pdf");
        assert_eq!(extension_for_mime_type(Some("application/x-unknown")), "jpg");
        assert_eq!(extension_for_mime_type(None), "jpg");
    }

    proptest! {
        #[test]
        fn known_subtypes_follow_fixed_table(
            index in 0..FIXED_TABLE.len(),
            payload in proptest::collection::vec(any::<u8>(), 1..256),
        ) {
            let (subtype, expected) = FIXED_TABLE[index];
            let uri = format!(
                "data:image/{};base64,{}",
                subtype,
                general_purpose::STANDARD.encode(&payload)
            );

            let decoded = decode_data_uri(&uri).expect("decode failed");
            prop_assert_eq!(decoded.bytes, payload);
            prop_assert_eq!(decoded.extension.as_str(), expected);
        }

        #[test]
        fn unknown_image_subtypes_default_to_jpg(
            subtype in "[a-z]{1,8}".prop_filter("known subtype", |s| {
                !FIXED_TABLE.iter().any(|(known, _)| known == s)
            }),
            payload in proptest::collection::vec(any::<u8>(), 1..64),
        ) {
            let uri = format!(
                "data:image/{};base64,{}",
                subtype,
                general_purpose::STANDARD.encode(&payload)
            );

            let decoded = decode_data_uri(&uri).expect("decode failed");
            prop_assert_eq!(decoded.extension.as_str(), "jpg");
        }
    }
}
