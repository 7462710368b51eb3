use bitflags::bitflags;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

bitflags! {
    /// Optional host behaviours, toggled independently by `/xlflags`.
    ///
    /// The empty set means "none" and is never listed in [`FeatureFlags::VARIANTS`].
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
    pub struct FeatureFlags: u32 {
        const CHAT_TIMESTAMPS = 1 << 0;
        const RICH_PRESENCE = 1 << 1;
        const MARKET_UPLOADER = 1 << 2;
        const DUTY_POP_NOTIFY = 1 << 3;
        const ITEM_LINK_PREVIEW = 1 << 4;
        const WATCH_ALERTS = 1 << 5;
    }
}

impl FeatureFlags {
    /// Every single-bit variant with its canonical name, in declaration order.
    pub const VARIANTS: &'static [(Self, &'static str)] = &[
        (Self::CHAT_TIMESTAMPS, "ChatTimestamps"),
        (Self::RICH_PRESENCE, "RichPresence"),
        (Self::MARKET_UPLOADER, "MarketUploader"),
        (Self::DUTY_POP_NOTIFY, "DutyPopNotify"),
        (Self::ITEM_LINK_PREVIEW, "ItemLinkPreview"),
        (Self::WATCH_ALERTS, "WatchAlerts"),
    ];

    /// Looks a variant up by canonical name, ignoring ASCII case.
    #[must_use]
    pub fn from_canonical_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::VARIANTS.iter().find(|(_, n)| n.eq_ignore_ascii_case(name)).map(|(flag, _)| *flag)
    }

    /// Canonical name of a single-bit variant.
    #[must_use]
    pub fn canonical_name(self) -> Option<&'static str> {
        Self::VARIANTS.iter().find(|(flag, _)| *flag == self).map(|(_, n)| *n)
    }

    /// Canonical names of the enabled variants, in declaration order.
    pub fn enabled_names(self) -> impl Iterator<Item = &'static str> {
        Self::VARIANTS.iter().filter(move |(flag, _)| self.contains(*flag)).map(|(_, n)| *n)
    }

    /// Union of every listed variant.
    #[must_use]
    pub fn every_variant() -> Self {
        Self::VARIANTS.iter().fold(Self::empty(), |acc, (flag, _)| acc | *flag)
    }
}

impl From<u32> for FeatureFlags {
    fn from(bits: u32) -> Self {
        Self::from_bits_retain(bits)
    }
}

impl Serialize for FeatureFlags {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u32(self.bits())
    }
}

impl<'de> Deserialize<'de> for FeatureFlags {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let bits = u32::deserialize(deserializer)?;
        Ok(Self::from_bits_retain(bits))
    }
}
