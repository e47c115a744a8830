//! Structured ffmpeg command line

use std::path::{Path, PathBuf};

use crate::engine::encoder::EncoderProfile;

/// How the filter graph reaches the engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterSource {
    /// Passed as the `-filter_complex` argument
    Inline(String),
    /// Written to a file and passed with `-filter_complex_script`
    Script(PathBuf),
}

/// One overlay pass: main input, auxiliary inputs, graph, encoder, output.
///
/// Serializes to the same argument vector for the same configuration.
#[derive(Debug, Clone)]
pub struct FfmpegCommand {
    input: PathBuf,
    auxiliary_inputs: Vec<PathBuf>,
    filter: FilterSource,
    encoder: EncoderProfile,
    output: PathBuf,
}

impl FfmpegCommand {
    pub fn new(
        input: impl Into<PathBuf>,
        filter: FilterSource,
        encoder: EncoderProfile,
        output: impl Into<PathBuf>,
    ) -> Self {
        Self {
            input: input.into(),
            auxiliary_inputs: Vec::new(),
            filter,
            encoder,
            output: output.into(),
        }
    }

    /// Add inputs after the main one; the first lands in slot 1
    pub fn with_auxiliary_inputs<I, P>(mut self, inputs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.auxiliary_inputs
            .extend(inputs.into_iter().map(Into::into));
        self
    }

    pub fn build(&self) -> Vec<String> {
        let mut args = vec![
            "-hide_banner".to_string(),
            "-nostdin".to_string(),
            "-y".to_string(),
        ];
        args.extend(self.encoder.device_args.iter().cloned());

        args.push("-i".to_string());
        args.push(path_arg(&self.input));
        for aux in &self.auxiliary_inputs {
            args.push("-i".to_string());
            args.push(path_arg(aux));
        }

        match &self.filter {
            FilterSource::Inline(graph) => {
                args.push("-filter_complex".to_string());
                args.push(graph.clone());
            }
            FilterSource::Script(path) => {
                args.push("-filter_complex_script".to_string());
                args.push(path_arg(path));
            }
        }

        args.extend([
            "-map".to_string(),
            "[vout]".to_string(),
            "-map".to_string(),
            "0:a?".to_string(),
            "-c:v".to_string(),
            self.encoder.codec.to_string(),
        ]);
        args.extend(self.encoder.codec_args.iter().cloned());
        args.extend(["-c:a".to_string(), "copy".to_string()]);
        args.push(path_arg(&self.output));
        args
    }
}

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::HardwareKind;

    #[test]
    fn test_software_command_layout() {
        let command = FfmpegCommand::new(
            "/in/source.mp4",
            FilterSource::Inline("[0:v]null[vout]".to_string()),
            EncoderProfile::with_threads(HardwareKind::None, 4),
            "/out/rendered.mp4",
        );
        let args = command.build();

        assert_eq!(args[..5], ["-hide_banner", "-nostdin", "-y", "-i", "/in/source.mp4"]);
        assert_eq!(args[5], "-filter_complex");
        assert_eq!(args[6], "[0:v]null[vout]");
        assert_eq!(args[7..13], ["-map", "[vout]", "-map", "0:a?", "-c:v", "libx264"]);
        assert_eq!(args.last().unwrap(), "/out/rendered.mp4");
        assert!(args.windows(2).any(|w| w == ["-c:a", "copy"]));
        assert!(!args.iter().any(|a| a == "-hwaccel"));
    }

    #[test]
    fn test_vaapi_device_precedes_inputs() {
        let args = FfmpegCommand::new(
            "in.mp4",
            FilterSource::Script(PathBuf::from("/tmp/filter.txt")),
            EncoderProfile::for_kind(HardwareKind::PlatformGpu),
            "out.mp4",
        )
        .with_auxiliary_inputs(["/tmp/badge.png"])
        .build();

        let device = args.iter().position(|a| a == "-vaapi_device").unwrap();
        let first_input = args.iter().position(|a| a == "-i").unwrap();
        assert!(device < first_input);
        assert!(args.windows(2).any(|w| w == ["-i", "/tmp/badge.png"]));
        assert!(args.windows(2).any(|w| w == ["-filter_complex_script", "/tmp/filter.txt"]));
        assert!(!args.iter().any(|a| a == "-filter_complex"));
    }

    #[test]
    fn test_build_is_deterministic() {
        let command = FfmpegCommand::new(
            "in.mp4",
            FilterSource::Inline("[0:v]null[vout]".to_string()),
            EncoderProfile::with_threads(HardwareKind::None, 2),
            "out.mp4",
        );
        assert_eq!(command.build(), command.clone().build());
    }
}
