use anyhow::{Context, Result};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str};
use reqwest::Url;

/// Characters escaped when a value is embedded as a single URI component.
pub const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Display name for a channel endpoint. Endpoints ending in an opaque numeric
/// code (optionally behind a two-letter marker, like `ex1234`) get a
/// positional name instead.
pub fn channel_label(url: &str, index: usize) -> String {
    let last = url.rsplit('/').next().unwrap_or(url);
    if last.is_empty() || is_numeric_placeholder(last) {
        return format!("Channel {}", index + 1);
    }
    percent_decode_str(last)
        .decode_utf8()
        .map(|decoded| decoded.into_owned())
        .unwrap_or_else(|_| last.to_string())
}

fn is_numeric_placeholder(segment: &str) -> bool {
    let bytes = segment.as_bytes();
    let digits = match bytes {
        [a, b, rest @ ..] if a.is_ascii_alphabetic() && b.is_ascii_alphabetic() => rest,
        _ => bytes,
    };
    digits.len() >= 3 && digits.iter().all(u8::is_ascii_digit)
}

pub fn parse_stream_base(raw: &str) -> Result<Url> {
    Url::parse(raw.trim()).with_context(|| format!("invalid stream page url {raw}"))
}

/// Link to the stream page for one channel of one match.
pub fn stream_link(base: &Url, match_id: &str, channel: &str) -> Url {
    let mut url = base.clone();
    url.query_pairs_mut()
        .append_pair("id", match_id)
        .append_pair("stream", channel);
    url
}

/// Recovers the channel endpoint embedded by [`stream_link`].
pub fn stream_param(link: &Url) -> Option<String> {
    link.query_pairs()
        .find(|(key, _)| key == "stream")
        .map(|(_, value)| value.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generic_codes_get_positional_names() {
        assert_eq!(channel_label("https://x.com/ex1234", 2), "Channel 3");
        assert_eq!(channel_label("https://x.com/98765", 0), "Channel 1");
        assert_eq!(channel_label("https://x.com/live/", 4), "Channel 5");
    }

    #[test]
    fn named_segments_are_decoded() {
        assert_eq!(channel_label("https://x.com/bbc-1", 0), "bbc-1");
        assert_eq!(channel_label("https://x.com/Sky%20Sports", 1), "Sky Sports");
        assert_eq!(channel_label("https://x.com/ex12", 0), "ex12");
        assert_eq!(channel_label("https://x.com/e1234", 0), "e1234");
    }

    #[test]
    fn stream_link_round_trips_channel() {
        let channel = "https://embed.example.tv/channel/Sky Sports?x=1&y=ä#frag";
        let base = parse_stream_base("https://watch.example.com/streampage/").unwrap();
        let link = stream_link(&base, "1760000000_2", channel);
        assert_eq!(stream_param(&link).as_deref(), Some(channel));
        assert!(link.as_str().contains("id=1760000000_2"));
    }

    #[test]
    fn rejects_relative_stream_base() {
        assert!(parse_stream_base("/streampage/").is_err());
    }
}
