//! Post-process parameter publication (bloom)

use glam::Vec4;

use crate::gpu::CommandStream;
use crate::scene::BloomSetting;

pub const BLOOM_HALF_SIZE_KEYWORD: &str = "_BLOOM_HALF_SIZE_DOWNSAMPLE";
pub const BLOOM_QUARTER_SIZE_KEYWORD: &str = "_BLOOM_QUARTER_SIZE_UPSAMPLE";

/// Publish the bloom parameters for the frame. A disabled bloom still
/// publishes a zero intensity so a previously active frame cannot leak
/// through the persistent globals.
pub fn publish_bloom(cmd: &mut CommandStream, bloom: &BloomSetting) {
    if !bloom.is_activated() {
        cmd.set_global_float("g_BloomIntensity", 0.0);
        cmd.disable_keyword(BLOOM_HALF_SIZE_KEYWORD);
        cmd.disable_keyword(BLOOM_QUARTER_SIZE_KEYWORD);
        return;
    }

    // Soft-knee threshold curve: (threshold, threshold - knee, 2*knee, 1/(4*knee))
    let knee = bloom.threshold * bloom.soft_knee + 1e-5;
    cmd.set_global_vec4(
        "g_BloomThreshold",
        Vec4::new(
            bloom.threshold,
            bloom.threshold - knee,
            2.0 * knee,
            0.25 / knee,
        ),
    );
    cmd.set_global_float("g_BloomIntensity", bloom.intensity);
    cmd.set_global_float("g_BloomDiffusion", bloom.diffusion);
    cmd.set_global_float("g_BloomClamp", bloom.clamp);
    cmd.set_global_float("g_BloomFireflyRemoval", bloom.firefly_removal_strength);
    cmd.set_global_vec4("g_BloomTint", bloom.tint.extend(1.0));

    if bloom.half_size_downsample {
        cmd.enable_keyword(BLOOM_HALF_SIZE_KEYWORD);
    } else {
        cmd.disable_keyword(BLOOM_HALF_SIZE_KEYWORD);
    }
    if bloom.quarter_size_upsample {
        cmd.enable_keyword(BLOOM_QUARTER_SIZE_KEYWORD);
    } else {
        cmd.disable_keyword(BLOOM_QUARTER_SIZE_KEYWORD);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn active_bloom_publishes_threshold_curve() {
        let bloom = BloomSetting {
            intensity: 0.5,
            ..Default::default()
        };
        let mut cmd = CommandStream::new();
        publish_bloom(&mut cmd, &bloom);

        let threshold = cmd.global_vec4("g_BloomThreshold").unwrap();
        let knee = 0.9 * 0.5 + 1e-5;
        assert_relative_eq!(threshold.x, 0.9);
        assert_relative_eq!(threshold.y, 0.9 - knee);
        assert_relative_eq!(threshold.z, 2.0 * knee);
        assert_relative_eq!(threshold.w, 0.25 / knee);
        assert_eq!(cmd.global_float("g_BloomIntensity"), Some(0.5));
        assert!(cmd.is_keyword_enabled(BLOOM_HALF_SIZE_KEYWORD));
    }

    #[test]
    fn disabled_bloom_zeroes_intensity() {
        let active = BloomSetting {
            intensity: 0.5,
            ..Default::default()
        };
        let mut cmd = CommandStream::new();
        publish_bloom(&mut cmd, &active);

        let disabled = BloomSetting::default();
        publish_bloom(&mut cmd, &disabled);
        assert_eq!(cmd.global_float("g_BloomIntensity"), Some(0.0));
        assert!(!cmd.is_keyword_enabled(BLOOM_HALF_SIZE_KEYWORD));
    }
}
