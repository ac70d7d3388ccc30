use crate::{error::Error, request::Headers};
use hyper::{
    header::{HeaderName, HeaderValue},
    HeaderMap,
};

pub fn extract_headers(header_map: &HeaderMap) -> Headers {
    let mut headers = Headers::with_capacity(header_map.keys_len());

    // it currently ignores header values with opaque characters
    for (key, value) in header_map {
        if let Ok(value) = value.to_str() {
            headers
                .entry(String::from(key.as_str()))
                .and_modify(|existing: &mut String| {
                    existing.push_str(", ");
                    existing.push_str(value);
                })
                .or_insert_with(|| String::from(value));
        }
    }

    headers
}

pub fn put_headers<'a, I: IntoIterator<Item = (&'a String, &'a String)>>(
    header_map: &mut HeaderMap<HeaderValue>,
    headers: I,
) -> Result<(), Error> {
    for (key, value) in headers {
        let header_name = HeaderName::from_lowercase(key.to_lowercase().as_bytes())?;
        let header_value = HeaderValue::from_str(value)?;
        header_map.append(header_name, header_value);
    }

    Ok(())
}
