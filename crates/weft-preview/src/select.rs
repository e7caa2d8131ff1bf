//! Display-file selection for multi-file generator output

use crate::generator::PreviewOutput;
use crate::orchestrator::PreviewDisplay;

/// Index of the file to show for `artifact`
///
/// The first name containing the artifact name, compared case-insensitively,
/// else the first file. `None` only for an empty set.
#[must_use]
pub fn pick_display_file<'a, I>(names: I, artifact: &str) -> Option<usize>
where
    I: IntoIterator<Item = &'a str>,
{
    let needle = artifact.to_lowercase();
    let mut any = false;
    for (index, name) in names.into_iter().enumerate() {
        any = true;
        if !needle.is_empty() && name.to_lowercase().contains(&needle) {
            return Some(index);
        }
    }
    any.then_some(0)
}

/// Turn generator output into what the preview area shows
#[must_use]
pub fn display_for(output: PreviewOutput, artifact: &str) -> PreviewDisplay {
    match output {
        PreviewOutput::Source(text) => PreviewDisplay::Source {
            file: None,
            files: Vec::new(),
            text,
        },
        PreviewOutput::Files(files) => {
            let Some(index) = pick_display_file(files.keys().map(String::as_str), artifact) else {
                return PreviewDisplay::Empty;
            };
            let names: Vec<String> = files.keys().cloned().collect();
            let (file, text) = files
                .into_iter()
                .nth(index)
                .unwrap_or_default();
            tracing::trace!(%file, artifact, "selected display file");
            PreviewDisplay::Source {
                file: Some(file),
                files: names,
                text,
            }
        }
    }
}
