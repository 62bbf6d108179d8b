use crate::keywords::Keywords;
use std::collections::BTreeMap;

/// Names of one channel (parameter) as declared in the TEXT segment.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Channel {
    /// `$PnN`, the channel name.
    #[cfg_attr(feature = "serde", serde(rename = "PnN"))]
    pub pnn: String,
    /// `$PnS`, the optional short/display name.
    #[cfg_attr(
        feature = "serde",
        serde(rename = "PnS", default, skip_serializing_if = "Option::is_none")
    )]
    pub pns: Option<String>,
}

impl Channel {
    /// Whether `name` matches the channel's `$PnN` or `$PnS`.
    pub fn matches(&self, name: &str) -> bool {
        self.pnn == name || self.pns.as_deref() == Some(name)
    }
}

/// Channels keyed by their 1-based `$Pn*` ordinal.
///
/// Only ordinals with a `$PnN` keyword appear. A channel counted by `$PAR`
/// but never named is absent, which lets callers tell it apart from an
/// ordinal beyond `$PAR`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct ChannelDirectory {
    channels: BTreeMap<usize, Channel>,
}

impl ChannelDirectory {
    /// Build the directory by scanning `keywords` for `p<digits>n` keys.
    pub fn from_keywords(keywords: &Keywords) -> Self {
        let mut channels = BTreeMap::new();
        for (key, value) in keywords.iter() {
            let Some(ordinal) = parse_name_key(key) else {
                continue;
            };
            let pns = keywords
                .channel_short_name(ordinal)
                .map(String::from);
            channels.insert(
                ordinal,
                Channel {
                    pnn: value.to_string(),
                    pns,
                },
            );
        }
        Self { channels }
    }

    /// Channel with the 1-based ordinal `n`.
    pub fn get(&self, n: usize) -> Option<&Channel> {
        self.channels.get(&n)
    }

    /// Channel addressed by its ordinal written as text, e.g. `"1"`.
    pub fn by_key(&self, key: &str) -> Option<&Channel> {
        key.parse::<usize>().ok().and_then(|n| self.get(n))
    }

    /// Ordinal of the first channel whose `$PnN` or `$PnS` equals `name`.
    pub fn find(&self, name: &str) -> Option<usize> {
        self.channels
            .iter()
            .find(|(_, ch)| ch.matches(name))
            .map(|(&n, _)| n)
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Iterate over `(ordinal, channel)` in ordinal order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &Channel)> {
        self.channels.iter().map(|(&n, ch)| (n, ch))
    }
}

/// Match `p<digits>n` (already lower-cased) and return the ordinal.
///
/// Ordinals start at 1 and carry no leading zeros, so `p01n` is not a
/// channel name key and cannot shadow `p1n`.
fn parse_name_key(key: &str) -> Option<usize> {
    let digits = key.strip_prefix('p')?.strip_suffix('n')?;
    if digits.is_empty()
        || digits.starts_with('0')
        || !digits.bytes().all(|b| b.is_ascii_digit())
    {
        return None;
    }
    digits.parse().ok()
}
