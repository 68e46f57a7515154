use chrono::{DateTime, Utc};
use wasm_bindgen::JsCast;

const SLUG_SUFFIX_CHARS: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
const SLUG_SUFFIX_LENGTH: usize = 5;

/// IMF-fixdate, as used by `Last-Modified` / `If-Unmodified-Since`.
const HTTP_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

pub(crate) fn now_ms() -> i64 {
    js_sys::Date::now().round() as i64
}

pub(crate) fn to_slug(v: &str) -> String {
    v.to_lowercase()
        .replace(' ', "-")
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-')
        .collect()
}

fn slug_suffix(random: &[u8]) -> String {
    random
        .iter()
        .map(|b| SLUG_SUFFIX_CHARS[usize::from(*b) % SLUG_SUFFIX_CHARS.len()] as char)
        .collect()
}

/// Slug with a short random tail, used when a name alone may collide.
pub(crate) fn to_slug_with_suffix(v: &str) -> String {
    let mut random = [0u8; SLUG_SUFFIX_LENGTH];
    if let Err(e) = getrandom::getrandom(&mut random) {
        tracing::warn!("no randomness for slug suffix: {e}");
    }
    format!("{}-{}", to_slug(v), slug_suffix(&random))
}

pub(crate) fn to_http_date(t: &DateTime<Utc>) -> String {
    t.format(HTTP_DATE_FORMAT).to_string()
}

pub(crate) fn parse_http_date(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc2822(s.trim())
        .ok()
        .map(|t| t.with_timezone(&Utc))
}

pub(crate) fn ensure_trailing_newline(mut content: String) -> String {
    if !content.ends_with('\n') {
        content.push('\n');
    }
    content
}

pub(crate) async fn copy_to_clipboard(text: &str) -> Result<(), String> {
    let window = web_sys::window().ok_or("no window")?;
    let promise = window.navigator().clipboard().write_text(text);
    wasm_bindgen_futures::JsFuture::from(promise)
        .await
        .map(|_| ())
        .map_err(|e| format!("clipboard write failed: {e:?}"))
}

pub(crate) async fn read_file_bytes(file: &web_sys::File) -> Result<Vec<u8>, String> {
    let buffer = wasm_bindgen_futures::JsFuture::from(file.array_buffer())
        .await
        .map_err(|e| format!("could not read {}: {e:?}", file.name()))?;
    Ok(js_sys::Uint8Array::new(&buffer).to_vec())
}

/// Offer `content` to the user as a file download.
pub(crate) fn download_text(content: &str, mime: &str, file_name: &str) -> Result<(), String> {
    let parts = js_sys::Array::of1(&wasm_bindgen::JsValue::from_str(content));
    let options = web_sys::BlobPropertyBag::new();
    options.set_type(mime);
    let blob = web_sys::Blob::new_with_str_sequence_and_options(&parts, &options)
        .map_err(|e| format!("{e:?}"))?;
    let url = web_sys::Url::create_object_url_with_blob(&blob).map_err(|e| format!("{e:?}"))?;

    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or("no document")?;
    let anchor = document
        .create_element("a")
        .map_err(|e| format!("{e:?}"))?
        .dyn_into::<web_sys::HtmlAnchorElement>()
        .map_err(|_| "not an anchor")?;
    anchor.set_href(&url);
    anchor.set_download(file_name);
    anchor.click();

    let _ = web_sys::Url::revoke_object_url(&url);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    #[test]
    fn slug_keeps_only_url_safe_chars() {
        assert_eq!(to_slug("My Amazing Note!"), "my-amazing-note");
        assert_eq!(to_slug("Café 2024"), "caf-2024");
    }

    #[test]
    fn slug_suffix_maps_into_alphabet() {
        assert_eq!(slug_suffix(&[0, 25, 26, 35, 36]), "az09a");
    }

    #[test]
    fn http_date_is_imf_fixdate() {
        let t = Utc.with_ymd_and_hms(2024, 3, 5, 7, 8, 9).unwrap();
        let s = to_http_date(&t);
        assert_eq!(s, "Tue, 05 Mar 2024 07:08:09 GMT");
        assert_eq!(parse_http_date(&s), Some(t));
    }

    #[test]
    fn trailing_newline_added_once() {
        assert_eq!(ensure_trailing_newline("# hi".to_string()), "# hi\n");
        assert_eq!(ensure_trailing_newline("# hi\n".to_string()), "# hi\n");
    }
}
