//! Device capability flags consumed by the queue runner.
//!
//! The runner never sniffs the environment itself: extension/version
//! detection happens wherever the GL context is created, and the result is
//! handed in as a [`DeviceCaps`] value. Capability-gated paths (fragment
//! output binding, copy-image, blit, texture readback) re-derive their
//! decision from these flags at execution time rather than caching it.

/// Which flavor of GL the context speaks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GlApi {
    /// Desktop OpenGL (core or compatibility).
    Desktop,
    /// OpenGL ES.
    Gles,
}

/// Capability flags and context version for one device context.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DeviceCaps {
    pub api: GlApi,
    pub major: u32,
    pub minor: u32,
    /// Dual-source blending (two indexed fragment outputs) is available.
    pub dual_source_blend: bool,
    /// Cross-vendor copy-image path (`ARB_copy_image` / `OES_copy_image`).
    pub copy_image: bool,
    /// Vendor copy-image fallback for pre-4.x hardware (`NV_copy_image`).
    pub copy_image_vendor: bool,
    /// Framebuffer-to-framebuffer blitting.
    pub framebuffer_blit: bool,
}

impl DeviceCaps {
    /// A fully featured desktop context, the common case on PC.
    pub fn desktop() -> Self {
        Self {
            api: GlApi::Desktop,
            major: 4,
            minor: 5,
            dual_source_blend: true,
            copy_image: true,
            copy_image_vendor: false,
            framebuffer_blit: true,
        }
    }

    /// A baseline GLES 3.0 context with no optional copy extensions.
    pub fn gles() -> Self {
        Self {
            api: GlApi::Gles,
            major: 3,
            minor: 0,
            dual_source_blend: false,
            copy_image: false,
            copy_image_vendor: false,
            framebuffer_blit: true,
        }
    }

    pub fn version_at_least(&self, major: u32, minor: u32) -> bool {
        (self.major, self.minor) >= (major, minor)
    }

    /// Whether fragment outputs can be bound by name (`glBindFragDataLocation`).
    ///
    /// Only desktop GL 3.3+ exposes this; GLES relies on `layout(location)`
    /// qualifiers in the shader source.
    pub fn named_fragment_output(&self) -> bool {
        self.api == GlApi::Desktop && self.version_at_least(3, 3)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_comparison_covers_minor_digits() {
        let caps = DeviceCaps {
            major: 3,
            minor: 3,
            ..DeviceCaps::desktop()
        };
        assert!(caps.version_at_least(3, 3));
        assert!(caps.version_at_least(3, 2));
        assert!(caps.version_at_least(2, 9));
        assert!(!caps.version_at_least(3, 4));
        assert!(!caps.version_at_least(4, 0));
    }

    #[test]
    fn named_fragment_output_requires_desktop_3_3() {
        let old_desktop = DeviceCaps {
            major: 3,
            minor: 2,
            ..DeviceCaps::desktop()
        };
        assert!(!old_desktop.named_fragment_output());
        assert!(DeviceCaps::desktop().named_fragment_output());

        let big_gles = DeviceCaps {
            major: 3,
            minor: 3,
            ..DeviceCaps::gles()
        };
        assert!(!big_gles.named_fragment_output());
    }
}
