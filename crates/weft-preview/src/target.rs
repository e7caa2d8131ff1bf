//! Target catalog: supported languages and, per language, frameworks

use crate::error::TargetError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Output language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    TypeScript,
    Python,
    Rust,
    Go,
    Java,
    CSharp,
}

impl Language {
    pub const ALL: [Language; 6] = [
        Language::TypeScript,
        Language::Python,
        Language::Rust,
        Language::Go,
        Language::Java,
        Language::CSharp,
    ];

    /// Wire name
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::TypeScript => "typescript",
            Self::Python => "python",
            Self::Rust => "rust",
            Self::Go => "go",
            Self::Java => "java",
            Self::CSharp => "csharp",
        }
    }

    /// Source file extension, without the dot
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::TypeScript => "ts",
            Self::Python => "py",
            Self::Rust => "rs",
            Self::Go => "go",
            Self::Java => "java",
            Self::CSharp => "cs",
        }
    }

    /// Frameworks in catalog order; the first one is the default
    #[must_use]
    pub fn frameworks(self) -> &'static [Framework] {
        match self {
            Self::TypeScript => &[
                Framework::Express,
                Framework::Fastify,
                Framework::Hono,
                Framework::NestJs,
            ],
            Self::Python => &[Framework::FastApi, Framework::Flask, Framework::Django],
            Self::Rust => &[Framework::Axum, Framework::ActixWeb],
            Self::Go => &[Framework::Gin, Framework::Echo, Framework::Chi],
            Self::Java => &[Framework::SpringBoot],
            Self::CSharp => &[Framework::AspNetCore],
        }
    }

    #[must_use]
    pub fn default_framework(self) -> Framework {
        self.frameworks()[0]
    }

    #[must_use]
    pub fn supports(self, framework: Framework) -> bool {
        self.frameworks().contains(&framework)
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Language {
    type Err = TargetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        match lowered.as_str() {
            "ts" => return Ok(Self::TypeScript),
            "py" => return Ok(Self::Python),
            "c#" | "cs" => return Ok(Self::CSharp),
            _ => {}
        }
        Self::ALL
            .iter()
            .copied()
            .find(|language| language.name() == lowered)
            .ok_or_else(|| TargetError::UnknownLanguage(s.to_string()))
    }
}

/// Web framework within a language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Framework {
    #[serde(rename = "express")]
    Express,
    #[serde(rename = "fastify")]
    Fastify,
    #[serde(rename = "hono")]
    Hono,
    #[serde(rename = "nestjs")]
    NestJs,
    #[serde(rename = "fastapi")]
    FastApi,
    #[serde(rename = "flask")]
    Flask,
    #[serde(rename = "django")]
    Django,
    #[serde(rename = "axum")]
    Axum,
    #[serde(rename = "actix-web")]
    ActixWeb,
    #[serde(rename = "gin")]
    Gin,
    #[serde(rename = "echo")]
    Echo,
    #[serde(rename = "chi")]
    Chi,
    #[serde(rename = "spring-boot")]
    SpringBoot,
    #[serde(rename = "aspnet-core")]
    AspNetCore,
}

impl Framework {
    pub const ALL: [Framework; 14] = [
        Framework::Express,
        Framework::Fastify,
        Framework::Hono,
        Framework::NestJs,
        Framework::FastApi,
        Framework::Flask,
        Framework::Django,
        Framework::Axum,
        Framework::ActixWeb,
        Framework::Gin,
        Framework::Echo,
        Framework::Chi,
        Framework::SpringBoot,
        Framework::AspNetCore,
    ];

    /// Wire name
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Express => "express",
            Self::Fastify => "fastify",
            Self::Hono => "hono",
            Self::NestJs => "nestjs",
            Self::FastApi => "fastapi",
            Self::Flask => "flask",
            Self::Django => "django",
            Self::Axum => "axum",
            Self::ActixWeb => "actix-web",
            Self::Gin => "gin",
            Self::Echo => "echo",
            Self::Chi => "chi",
            Self::SpringBoot => "spring-boot",
            Self::AspNetCore => "aspnet-core",
        }
    }

    /// Language this framework belongs to
    #[must_use]
    pub fn language(self) -> Language {
        Language::ALL
            .iter()
            .copied()
            .find(|language| language.supports(self))
            .unwrap_or(Language::TypeScript)
    }
}

impl fmt::Display for Framework {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Framework {
    type Err = TargetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|framework| framework.name() == lowered)
            .ok_or_else(|| TargetError::UnknownFramework(s.to_string()))
    }
}

/// A supported (language, framework) pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "TargetRepr")]
pub struct Target {
    language: Language,
    framework: Framework,
}

#[derive(Deserialize)]
struct TargetRepr {
    language: Language,
    framework: Framework,
}

impl TryFrom<TargetRepr> for Target {
    type Error = TargetError;

    fn try_from(repr: TargetRepr) -> Result<Self, Self::Error> {
        Self::new(repr.language, repr.framework)
    }
}

impl Target {
    /// Pair `language` with `framework`
    ///
    /// # Errors
    /// Returns [`TargetError::Unsupported`] if the framework belongs to a
    /// different language.
    pub fn new(language: Language, framework: Framework) -> Result<Self, TargetError> {
        if language.supports(framework) {
            Ok(Self { language, framework })
        } else {
            Err(TargetError::Unsupported {
                language: language.to_string(),
                framework: framework.to_string(),
            })
        }
    }

    /// `language` with its default framework
    #[must_use]
    pub fn for_language(language: Language) -> Self {
        Self {
            language,
            framework: language.default_framework(),
        }
    }

    /// Parse `"rust/axum"`; a bare language picks its default framework
    ///
    /// # Errors
    /// Unknown names, unsupported pairs, or more than one `/`.
    pub fn parse(raw: &str) -> Result<Self, TargetError> {
        let mut parts = raw.split('/');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(language), None, None) if !language.trim().is_empty() => {
                Ok(Self::for_language(language.parse()?))
            }
            (Some(language), Some(framework), None) => {
                Self::new(language.parse()?, framework.parse()?)
            }
            _ => Err(TargetError::Malformed(raw.to_string())),
        }
    }

    #[inline]
    #[must_use]
    pub fn language(&self) -> Language {
        self.language
    }

    #[inline]
    #[must_use]
    pub fn framework(&self) -> Framework {
        self.framework
    }

    /// Every supported pair, in catalog order
    pub fn catalog() -> impl Iterator<Item = Target> {
        Language::ALL.into_iter().flat_map(|language| {
            language
                .frameworks()
                .iter()
                .map(move |&framework| Target { language, framework })
        })
    }
}

impl Default for Target {
    fn default() -> Self {
        Self::for_language(Language::TypeScript)
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.language, self.framework)
    }
}

impl FromStr for Target {
    type Err = TargetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
