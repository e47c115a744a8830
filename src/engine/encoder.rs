//! Encoder option sets per hardware path

use crate::domain::model::HardwareKind;

/// Render node used for VA-API encoding
pub const VAAPI_DEVICE: &str = "/dev/dri/renderD128";

/// Codec and options for one hardware path.
///
/// Chosen once per job and reused for every batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncoderProfile {
    pub kind: HardwareKind,
    pub codec: &'static str,
    /// Global options placed before the first input
    pub device_args: Vec<String>,
    /// Options placed after `-c:v <codec>`
    pub codec_args: Vec<String>,
}

impl EncoderProfile {
    pub fn for_kind(kind: HardwareKind) -> Self {
        Self::with_threads(kind, num_cpus::get())
    }

    /// Profile with an explicit software thread count
    pub fn with_threads(kind: HardwareKind, threads: usize) -> Self {
        match kind {
            HardwareKind::DedicatedGpu => Self {
                kind,
                codec: "h264_nvenc",
                device_args: Vec::new(),
                codec_args: strings(&["-preset", "p4", "-rc", "vbr", "-cq", "23"]),
            },
            HardwareKind::IntegratedGpu => Self {
                kind,
                codec: "h264_qsv",
                device_args: Vec::new(),
                codec_args: strings(&[
                    "-global_quality",
                    "23",
                    "-look_ahead",
                    "0",
                    "-pix_fmt",
                    "nv12",
                ]),
            },
            HardwareKind::PlatformGpu => Self {
                kind,
                codec: "h264_vaapi",
                device_args: strings(&["-vaapi_device", VAAPI_DEVICE]),
                codec_args: strings(&["-qp", "23"]),
            },
            HardwareKind::None => {
                let mut codec_args = strings(&["-preset", "fast", "-crf", "23", "-threads"]);
                codec_args.push(threads.max(1).to_string());
                Self {
                    kind,
                    codec: "libx264",
                    device_args: Vec::new(),
                    codec_args,
                }
            }
        }
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_software_profile_uses_thread_count() {
        let profile = EncoderProfile::with_threads(HardwareKind::None, 6);
        assert_eq!(profile.codec, "libx264");
        assert_eq!(
            profile.codec_args,
            vec!["-preset", "fast", "-crf", "23", "-threads", "6"]
        );
        assert!(profile.device_args.is_empty());
    }

    #[test]
    fn test_vaapi_profile_names_device() {
        let profile = EncoderProfile::for_kind(HardwareKind::PlatformGpu);
        assert_eq!(profile.codec, "h264_vaapi");
        assert_eq!(profile.device_args, vec!["-vaapi_device", VAAPI_DEVICE]);
        assert_eq!(profile.codec_args, vec!["-qp", "23"]);
    }

    #[test]
    fn test_gpu_codecs() {
        assert_eq!(EncoderProfile::for_kind(HardwareKind::DedicatedGpu).codec, "h264_nvenc");
        let qsv = EncoderProfile::for_kind(HardwareKind::IntegratedGpu);
        assert_eq!(qsv.codec, "h264_qsv");
        assert!(qsv.codec_args.ends_with(&["-pix_fmt".to_string(), "nv12".to_string()]));
    }
}
