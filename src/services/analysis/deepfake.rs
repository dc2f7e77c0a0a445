// Deepfake Artifact Overlay
// Byte-level screening hints for image, video and audio payloads

use crate::models::{clamp_score, DeepfakeAnalysis};
use crate::services::analysis::heuristics::shannon_entropy;

const BASE_ARTIFACT_SCORE: f64 = 20.0;
const ARTIFACT_CAP: u8 = 95;
const ENTROPY_THRESHOLD: f64 = 7.2;
const REENCODE_SIZE_FLOOR: usize = 500_000;
const VOICE_CLONE_SIZE_FLOOR: usize = 1_000_000;
const HIGH_RES_SIZE_FLOOR: usize = 5_000_000;
const SAMPLE_BYTES: usize = 10_240;

pub fn analyze_deepfake_artifacts(bytes: &[u8], mime: &str) -> Option<DeepfakeAnalysis> {
    let is_image = mime.starts_with("image/");
    let is_video = mime.starts_with("video/");
    let is_audio = mime.starts_with("audio/");
    if !is_image && !is_video && !is_audio {
        return None;
    }

    let mut score = BASE_ARTIFACT_SCORE;
    let mut indicators = Vec::new();
    let mut requires_frame_review = false;

    if is_image || is_video {
        let entropy = shannon_entropy(&bytes[..bytes.len().min(SAMPLE_BYTES)]);
        if entropy > ENTROPY_THRESHOLD && bytes.len() > REENCODE_SIZE_FLOOR {
            score += 40.0;
            indicators
                .push("Byte entropy consistent with re-encoded or synthesized frames".to_string());
        }
    }

    if is_video {
        score += 20.0;
        requires_frame_review = true;
        indicators.push("Video content requires frame-level review".to_string());
    }

    if is_audio {
        if bytes.len() > VOICE_CLONE_SIZE_FLOOR {
            score += 35.0;
            indicators.push("Long-form audio suitable for voice-clone screening".to_string());
        } else {
            score += 15.0;
            indicators.push("Short audio clip limits synthesis screening".to_string());
        }
    }

    if bytes.len() > HIGH_RES_SIZE_FLOOR {
        score += 20.0;
        indicators.push("High-resolution payload".to_string());
    }

    Some(DeepfakeAnalysis {
        artifact_score: clamp_score(score).min(ARTIFACT_CAP),
        indicators,
        requires_frame_review,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pseudo_random_bytes(len: usize) -> Vec<u8> {
        let mut state = 0x9E3779B97F4A7C15u64;
        (0..len)
            .map(|_| {
                state = state
                    .wrapping_mul(6364136223846793005)
                    .wrapping_add(1442695040888963407);
                (state >> 33) as u8
            })
            .collect()
    }

    #[test]
    fn test_non_media_returns_none() {
        assert!(analyze_deepfake_artifacts(&[1, 2, 3], "application/pdf").is_none());
        assert!(analyze_deepfake_artifacts(&[1, 2, 3], "text/plain").is_none());
    }

    #[test]
    fn test_video_requires_frame_review_and_caps_at_95() {
        let bytes = pseudo_random_bytes(6_000_000);
        let analysis = analyze_deepfake_artifacts(&bytes, "video/mp4").unwrap();
        assert!(analysis.requires_frame_review);
        // 20 base + 40 entropy + 20 video + 20 size = 100, capped
        assert_eq!(analysis.artifact_score, 95);
        assert!(analysis
            .indicators
            .iter()
            .any(|i| i == "Video content requires frame-level review"));
    }

    #[test]
    fn test_audio_length_paths() {
        let short = analyze_deepfake_artifacts(&vec![9u8; 100_000], "audio/mpeg").unwrap();
        assert_eq!(short.artifact_score, 35);
        assert!(!short.requires_frame_review);

        let long = analyze_deepfake_artifacts(&vec![9u8; 2_000_000], "audio/mpeg").unwrap();
        assert_eq!(long.artifact_score, 55);
    }

    #[test]
    fn test_small_plain_image_scores_base_only() {
        let analysis = analyze_deepfake_artifacts(&vec![0u8; 10_000], "image/png").unwrap();
        assert_eq!(analysis.artifact_score, 20);
        assert!(analysis.indicators.is_empty());
        assert!(!analysis.requires_frame_review);
    }
}
