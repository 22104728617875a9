use serde::{Deserialize, Serialize};

/// 嚴格模式下的完成標記，以子字串比對整行內容
pub const COMPLETION_MARKER: &str = "Build complete!";

pub const EXPORT_FILENAME: &str = "build-log.txt";

/// Which field set and validation rules the form applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum FormMode {
    /// Repository URL only, must be a GitHub HTTPS URL. Logs arrive over a
    /// GET stream and end at the completion marker.
    #[default]
    Strict,
    /// Repository, service and build tool, each required. The stream request
    /// itself starts the build and ends when the server closes it.
    MultiField,
}

impl FormMode {
    pub fn uses_completion_marker(self) -> bool {
        matches!(self, FormMode::Strict)
    }

    pub fn has_separate_trigger(self) -> bool {
        matches!(self, FormMode::Strict)
    }

    pub fn shows_errors_in_log(self) -> bool {
        matches!(self, FormMode::MultiField)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildRequest {
    pub mode: FormMode,
    pub repository_url: String,
    pub service_name: Option<String>,
    pub build_tool: Option<String>,
}

impl BuildRequest {
    pub fn payload(&self) -> BuildPayload<'_> {
        match self.mode {
            FormMode::Strict => BuildPayload::Strict {
                repo_url: &self.repository_url,
            },
            FormMode::MultiField => BuildPayload::MultiField {
                repo: &self.repository_url,
                service: self.service_name.as_deref().unwrap_or_default(),
                build: self.build_tool.as_deref().unwrap_or_default(),
            },
        }
    }
}

/// JSON body sent to the build server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum BuildPayload<'a> {
    Strict {
        #[serde(rename = "repoUrl")]
        repo_url: &'a str,
    },
    MultiField {
        repo: &'a str,
        service: &'a str,
        build: &'a str,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogBuffer {
    lines: Vec<String>,
}

impl LogBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, line: String) {
        self.lines.push(line);
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// 以換行連接，結尾不加任何內容
    pub fn export(&self) -> String {
        self.lines.join("\n")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb(pub u8, pub u8, pub u8);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub foreground: Rgb,
    pub log_foreground: Rgb,
    pub indicator: Rgb,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn toggle(self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }

    pub fn palette(self) -> Palette {
        match self {
            Theme::Dark => Palette {
                foreground: Rgb(0xff, 0xff, 0xff),
                log_foreground: Rgb(0x00, 0xff, 0x88),
                indicator: Rgb(0x99, 0x99, 0x99),
            },
            Theme::Light => Palette {
                foreground: Rgb(0x11, 0x11, 0x11),
                log_foreground: Rgb(0x33, 0x33, 0x33),
                indicator: Rgb(0x99, 0x99, 0x99),
            },
        }
    }

    /// Label of the control that switches to the other theme.
    pub fn toggle_label(self) -> &'static str {
        match self {
            Theme::Dark => "🌞 Light Mode",
            Theme::Light => "🌙 Dark Mode",
        }
    }
}
