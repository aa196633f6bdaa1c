//! The three images the globe samples.

/// A texture input of the globe renderer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TextureSlot {
    /// Surface albedo.
    ColorMap,
    /// Surface specular strength in the red channel; bright over oceans.
    SpecularMap,
    /// Cloud albedo with coverage in alpha.
    CloudMap,
}

impl TextureSlot {
    pub const ALL: [TextureSlot; 3] = [Self::ColorMap, Self::SpecularMap, Self::CloudMap];

    /// Position in [`Self::ALL`].
    pub fn index(self) -> usize {
        match self {
            Self::ColorMap => 0,
            Self::SpecularMap => 1,
            Self::CloudMap => 2,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::ColorMap => "color-map",
            Self::SpecularMap => "specular-map",
            Self::CloudMap => "cloud-map",
        }
    }

    /// Colour images are sRGB-encoded; the specular mask is plain data.
    pub fn format(self) -> wgpu::TextureFormat {
        match self {
            Self::ColorMap | Self::CloudMap => wgpu::TextureFormat::Rgba8UnormSrgb,
            Self::SpecularMap => wgpu::TextureFormat::Rgba8Unorm,
        }
    }

    /// 1x1 stand-in used until the real image arrives, or forever if it fails.
    pub fn placeholder_rgba(self) -> [u8; 4] {
        match self {
            // Plain white ball, no highlights, no clouds.
            Self::ColorMap => [255, 255, 255, 255],
            Self::SpecularMap => [0, 0, 0, 255],
            Self::CloudMap => [255, 255, 255, 0],
        }
    }
}

impl std::fmt::Display for TextureSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_matches_all_order() {
        for (i, slot) in TextureSlot::ALL.iter().enumerate() {
            assert_eq!(slot.index(), i);
        }
    }

    #[test]
    fn test_formats() {
        assert!(TextureSlot::ColorMap.format().is_srgb());
        assert!(TextureSlot::CloudMap.format().is_srgb());
        assert!(!TextureSlot::SpecularMap.format().is_srgb());
    }

    #[test]
    fn test_placeholders_are_neutral() {
        assert_eq!(TextureSlot::CloudMap.placeholder_rgba()[3], 0, "no clouds");
        assert_eq!(TextureSlot::SpecularMap.placeholder_rgba()[0], 0, "no highlights");
        assert_eq!(TextureSlot::ColorMap.placeholder_rgba(), [255; 4]);
    }

    #[test]
    fn test_names_unique() {
        let names: std::collections::HashSet<_> =
            TextureSlot::ALL.iter().map(|s| s.name()).collect();
        assert_eq!(names.len(), 3);
    }
}
