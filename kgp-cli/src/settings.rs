// ABOUTME: Resolved display settings combining command-line flags and config files
// ABOUTME: Rejects invalid combinations before any terminal I/O happens

use crate::cli::{Cli, MediumChoice, PlaceholderMode};
use crate::config::Config;
use crate::display::geometry::TerminalGeometry;
use crate::display::sizing::SizeConstraints;
use anyhow::{Context, Result, anyhow};
use kgp_sdk::constants::limits::DEFAULT_CHUNK_SIZE;
use kgp_sdk::{ImageId, KgpError};
use std::path::PathBuf;

/// Upper bound on one display axis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Limit {
    /// Use the terminal's extent
    Terminal,
    Unlimited,
    Cells(u32),
}

impl Limit {
    fn from_setting(value: Option<u32>) -> Self {
        match value {
            None => Limit::Terminal,
            Some(0) => Limit::Unlimited,
            Some(cells) => Limit::Cells(cells),
        }
    }

    fn resolve(self, terminal: u16) -> Option<u32> {
        match self {
            Limit::Terminal => Some(u32::from(terminal)),
            Limit::Unlimited => None,
            Limit::Cells(cells) => Some(cells),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub path: PathBuf,
    pub cols: Option<u32>,
    pub rows: Option<u32>,
    pub max_cols: Limit,
    pub max_rows: Limit,
    pub placeholder: PlaceholderMode,
    pub medium: MediumChoice,
    pub image_id: Option<ImageId>,
    pub png: bool,
    pub chunk_size: usize,
    pub wait: bool,
}

impl Settings {
    /// Flags win over config values
    pub fn resolve(cli: &Cli, config: &Config) -> Result<Self> {
        let path = cli
            .path
            .clone()
            .ok_or_else(|| anyhow!("Image path is required unless --query is specified"))?;
        if !path.is_file() {
            return Err(anyhow!(
                "Image path does not exist or is not a file: {}",
                path.display()
            ));
        }

        let chunk_size = cli
            .chunk_size
            .or(config.chunk_size)
            .unwrap_or(DEFAULT_CHUNK_SIZE);
        if chunk_size == 0 {
            return Err(KgpError::Configuration(
                "Chunk size must be a positive integer".to_string(),
            )
            .into());
        }

        let image_id = cli
            .image_id
            .map(ImageId::new)
            .transpose()
            .context("Invalid --image-id")?;

        let cols = cli.width.filter(|c| *c > 0);
        let rows = cli.height.filter(|r| *r > 0);
        let max_cols = Limit::from_setting(cli.max_cols.or(config.max_cols));
        let max_rows = Limit::from_setting(cli.max_rows.or(config.max_rows));

        if let (Limit::Cells(max), Some(cols)) = (max_cols, cols) {
            if max < cols {
                return Err(KgpError::Configuration(
                    "max-cols cannot be less than the number of display columns".to_string(),
                )
                .into());
            }
        }
        if let (Limit::Cells(max), Some(rows)) = (max_rows, rows) {
            if max < rows {
                return Err(KgpError::Configuration(
                    "max-rows cannot be less than the number of display rows".to_string(),
                )
                .into());
            }
        }

        let placeholder = match cli.unicode_placeholder {
            Some(mode) => mode,
            None => config.placeholder_mode()?.unwrap_or(PlaceholderMode::Auto),
        };
        let medium = match cli.transmission_medium {
            Some(choice) => choice,
            None => config.medium()?.unwrap_or(MediumChoice::Auto),
        };

        Ok(Self {
            path,
            cols,
            rows,
            max_cols,
            max_rows,
            placeholder,
            medium,
            image_id,
            png: cli.png || config.png.unwrap_or(false),
            chunk_size,
            wait: cli.wait,
        })
    }

    /// Size constraints with terminal-derived maxima filled in
    pub fn constraints(&self, geometry: &TerminalGeometry) -> SizeConstraints {
        let max_cols = self.max_cols.resolve(geometry.cols);
        let max_rows = self.max_rows.resolve(geometry.rows);
        if self.max_cols == Limit::Terminal || self.max_rows == Limit::Terminal {
            log::debug!("Auto-detected maximum size: {:?}x{:?}", max_cols, max_rows);
        }

        SizeConstraints {
            cols: self.cols,
            rows: self.rows,
            max_cols,
            max_rows,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use tempfile::NamedTempFile;

    fn parse(image: &NamedTempFile, extra: &[&str]) -> Cli {
        let path = image.path().to_string_lossy().to_string();
        let mut args = vec!["kgp".to_string(), path];
        args.extend(extra.iter().map(|s| s.to_string()));
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_defaults() {
        let image = NamedTempFile::new().unwrap();
        let settings = Settings::resolve(&parse(&image, &[]), &Config::default()).unwrap();

        assert_eq!(settings.chunk_size, 4096);
        assert_eq!(settings.placeholder, PlaceholderMode::Auto);
        assert_eq!(settings.medium, MediumChoice::Auto);
        assert_eq!(settings.max_cols, Limit::Terminal);
        assert!(settings.image_id.is_none());
        assert!(!settings.png);
    }

    #[test]
    fn test_flags_override_config() {
        let image = NamedTempFile::new().unwrap();
        let config = Config {
            transmission_medium: Some("temp-file".to_string()),
            chunk_size: Some(512),
            png: Some(true),
            ..Default::default()
        };
        let cli = parse(&image, &["--transmission-medium", "direct"]);
        let settings = Settings::resolve(&cli, &config).unwrap();

        assert_eq!(settings.medium, MediumChoice::Direct);
        assert_eq!(settings.chunk_size, 512);
        assert!(settings.png);
    }

    #[test]
    fn test_zero_chunk_size_rejected() {
        let image = NamedTempFile::new().unwrap();
        let cli = parse(&image, &["--chunk-size", "0"]);
        let err = Settings::resolve(&cli, &Config::default()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<KgpError>(),
            Some(KgpError::Configuration(_))
        ));
    }

    #[test]
    fn test_image_id_out_of_range() {
        let image = NamedTempFile::new().unwrap();
        let cli = parse(&image, &["--image-id", "16777216"]);
        let err = Settings::resolve(&cli, &Config::default()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<KgpError>(),
            Some(KgpError::InvalidImageId(16777216))
        ));

        let cli = parse(&image, &["--image-id", "16777215"]);
        let settings = Settings::resolve(&cli, &Config::default()).unwrap();
        assert_eq!(settings.image_id.map(ImageId::get), Some(0xFF_FFFF));
    }

    #[test]
    fn test_max_smaller_than_requested() {
        let image = NamedTempFile::new().unwrap();
        let cli = parse(&image, &["--width", "50", "--max-cols", "40"]);
        assert!(Settings::resolve(&cli, &Config::default()).is_err());

        let cli = parse(&image, &["--height", "10", "--max-rows", "5"]);
        assert!(Settings::resolve(&cli, &Config::default()).is_err());

        // 0 means no limit
        let cli = parse(&image, &["--width", "50", "--max-cols", "0"]);
        assert!(Settings::resolve(&cli, &Config::default()).is_ok());
    }

    #[test]
    fn test_missing_image_rejected() {
        let cli = Cli::try_parse_from(["kgp", "/nonexistent/picture.png"]).unwrap();
        assert!(Settings::resolve(&cli, &Config::default()).is_err());
    }

    #[test]
    fn test_constraints_from_terminal() {
        let image = NamedTempFile::new().unwrap();
        let cli = parse(&image, &["--width", "0", "--max-rows", "0"]);
        let settings = Settings::resolve(&cli, &Config::default()).unwrap();
        let geometry = TerminalGeometry::new(120, 40, 1200, 800).unwrap();

        assert_eq!(
            settings.constraints(&geometry),
            SizeConstraints {
                cols: None,
                rows: None,
                max_cols: Some(120),
                max_rows: None,
            }
        );
    }
}
