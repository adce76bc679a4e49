use popword_config::Locale;
use popword_translator::TranslateError;
use popword_types::{ErrorKind, TranslateFailure, TranslationMode};

/// Sort a backend error into the failure taxonomy
pub fn classify(err: &TranslateError) -> ErrorKind {
    if err.is_malformed() {
        ErrorKind::Malformed
    } else {
        ErrorKind::Network
    }
}

/// Short user-facing description of a failure kind
pub fn describe(kind: ErrorKind, locale: Locale) -> &'static str {
    match (locale, kind) {
        (Locale::En, ErrorKind::Network) => "Could not reach the translation service",
        (Locale::En, ErrorKind::Malformed) => "The translation service sent an unexpected response",
        (Locale::En, ErrorKind::Degenerate) => "No translation available",
        (Locale::En, ErrorKind::EmptyText) => "Nothing to translate",
        (Locale::En, ErrorKind::Superseded) => "Replaced by a newer translation",
        (Locale::En, ErrorKind::Internal) => "Translation failed unexpectedly",
        (Locale::Vi, ErrorKind::Network) => "Không thể kết nối dịch vụ dịch",
        (Locale::Vi, ErrorKind::Malformed) => "Dịch vụ dịch trả về dữ liệu không hợp lệ",
        (Locale::Vi, ErrorKind::Degenerate) => "Không có bản dịch",
        (Locale::Vi, ErrorKind::EmptyText) => "Không có văn bản để dịch",
        (Locale::Vi, ErrorKind::Superseded) => "Đã được thay bằng yêu cầu dịch mới hơn",
        (Locale::Vi, ErrorKind::Internal) => "Dịch thất bại do lỗi không mong đợi",
    }
}

pub fn failure(
    kind: ErrorKind,
    mode: TranslationMode,
    locale: Locale,
    detail: Option<&str>,
) -> TranslateFailure {
    let message = match detail {
        Some(detail) if !detail.is_empty() => format!("{}: {}", describe(kind, locale), detail),
        _ => describe(kind, locale).to_string(),
    };

    TranslateFailure {
        kind,
        message,
        mode,
    }
}

pub fn from_translate_error(
    err: &TranslateError,
    mode: TranslationMode,
    locale: Locale,
) -> TranslateFailure {
    failure(classify(err), mode, locale, Some(&err.to_string()))
}
