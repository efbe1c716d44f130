//! Industry selector — a closed set of domains, each fixing the section ids,
//! titles and prompt framing the initial generation asks for.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The domain the candidate is interviewing in. Drives prompt framing and the
/// expected section layout; never inferred from response content.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Industry {
    #[default]
    Tech,
    Finance,
    Healthcare,
    Consulting,
    Sales,
    General,
}

/// One expected section of the initial guide.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct SectionTemplate {
    pub id: &'static str,
    pub title: &'static str,
    /// Block type the generator should prefer for this section.
    pub block_type: &'static str,
    /// What the section should contain, phrased for the prompt.
    pub focus: &'static str,
}

const INTRO: SectionTemplate = SectionTemplate {
    id: "intro",
    title: "The Narrative & Self-Intro",
    block_type: "guide",
    focus: "A 'Tell me about yourself' strategy (guide with Hook/Bridge/Goal points) \
            followed by a first-person draft script (type 'script').",
};

const BEHAVIORAL: SectionTemplate = SectionTemplate {
    id: "behavioral",
    title: "Behavioral & Culture Fit",
    block_type: "qa",
    focus: "A culture map (guide) from the company info, then behavioral questions \
            with STAR-method good answers and red-flag bad answers.",
};

const REVERSE: SectionTemplate = SectionTemplate {
    id: "reverse",
    title: "Questions to Ask",
    block_type: "list",
    focus: "Lists of strategic questions and culture checks the candidate should ask.",
};

const TECH: &[SectionTemplate] = &[
    INTRO,
    SectionTemplate {
        id: "tech_stack",
        title: "Tech Stack Drill",
        block_type: "stack_group",
        focus: "One stack_group per tool in the JD (stackName, description, 5-6 \
                questions each with answerPoints).",
    },
    SectionTemplate {
        id: "technical",
        title: "Technical Deep Dive",
        block_type: "qa",
        focus: "5-6 system design and role-specific questions with insight, \
                goodAnswerPoints, badAnswerPoints and keywords.",
    },
    BEHAVIORAL,
    REVERSE,
];

const FINANCE: &[SectionTemplate] = &[
    INTRO,
    SectionTemplate {
        id: "technical",
        title: "Finance Technicals",
        block_type: "qa",
        focus: "Accounting, valuation and modeling questions with good and bad answers.",
    },
    SectionTemplate {
        id: "markets",
        title: "Markets & Deal Discussion",
        block_type: "qa",
        focus: "Current-markets and deal walkthrough questions tied to the firm's focus.",
    },
    BEHAVIORAL,
    REVERSE,
];

const HEALTHCARE: &[SectionTemplate] = &[
    INTRO,
    SectionTemplate {
        id: "clinical",
        title: "Clinical & Compliance Scenarios",
        block_type: "qa",
        focus: "Patient-safety, privacy and regulatory scenarios with good and bad answers.",
    },
    SectionTemplate {
        id: "technical",
        title: "Role Competency",
        block_type: "qa",
        focus: "Role-specific skill questions drawn from the JD.",
    },
    BEHAVIORAL,
    REVERSE,
];

const CONSULTING: &[SectionTemplate] = &[
    INTRO,
    SectionTemplate {
        id: "case",
        title: "Case Interview Drill",
        block_type: "guide",
        focus: "Two short practice cases with a structuring guide and sample math.",
    },
    SectionTemplate {
        id: "technical",
        title: "Frameworks & Estimation",
        block_type: "qa",
        focus: "Market sizing and framework questions with good and bad answers.",
    },
    BEHAVIORAL,
    REVERSE,
];

const SALES: &[SectionTemplate] = &[
    INTRO,
    SectionTemplate {
        id: "pitch",
        title: "Pitch & Objection Handling",
        block_type: "script",
        focus: "A mock pitch script plus common objections with good and bad responses.",
    },
    SectionTemplate {
        id: "technical",
        title: "Pipeline & Metrics",
        block_type: "qa",
        focus: "Quota, pipeline and forecasting questions with good and bad answers.",
    },
    BEHAVIORAL,
    REVERSE,
];

const GENERAL: &[SectionTemplate] = &[
    INTRO,
    SectionTemplate {
        id: "technical",
        title: "Role Competency",
        block_type: "qa",
        focus: "3-4 skill questions found in the JD with insight, good and bad answers.",
    },
    BEHAVIORAL,
    REVERSE,
];

impl Industry {
    pub const ALL: [Industry; 6] = [
        Industry::Tech,
        Industry::Finance,
        Industry::Healthcare,
        Industry::Consulting,
        Industry::Sales,
        Industry::General,
    ];

    pub fn sections(self) -> &'static [SectionTemplate] {
        match self {
            Industry::Tech => TECH,
            Industry::Finance => FINANCE,
            Industry::Healthcare => HEALTHCARE,
            Industry::Consulting => CONSULTING,
            Industry::Sales => SALES,
            Industry::General => GENERAL,
        }
    }

    /// Role framing injected into the system instruction.
    pub fn framing(self) -> &'static str {
        match self {
            Industry::Tech => {
                "You are an expert Senior Technical Recruiter and Interview Coach for software \
                 and infrastructure roles. Extract every tool and framework in the JD into the \
                 tech stack drill."
            }
            Industry::Finance => {
                "You are a former investment banking recruiter and interview coach. Hold \
                 answers to the technical precision expected on a finance superday."
            }
            Industry::Healthcare => {
                "You are a healthcare hiring manager and interview coach. Weight patient \
                 safety, privacy and regulatory judgement heavily."
            }
            Industry::Consulting => {
                "You are a management consulting case coach. Favour structured, \
                 hypothesis-driven answers and clean mental math."
            }
            Industry::Sales => {
                "You are a sales leader and interview coach. Reward quantified quota \
                 attainment, discovery skill and composure under objections."
            }
            Industry::General => {
                "You are an expert Senior Recruiter and Interview Coach."
            }
        }
    }

    /// Template for a fixed section id, if this industry defines one.
    pub fn template(self, id: &str) -> Option<&'static SectionTemplate> {
        self.sections().iter().find(|t| t.id == id)
    }
}

impl fmt::Display for Industry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Industry::Tech => "Tech",
            Industry::Finance => "Finance",
            Industry::Healthcare => "Healthcare",
            Industry::Consulting => "Consulting",
            Industry::Sales => "Sales",
            Industry::General => "General",
        };
        f.write_str(name)
    }
}

impl FromStr for Industry {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Industry::ALL
            .into_iter()
            .find(|i| i.to_string().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| format!("unknown industry '{wanted}'"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_every_industry_has_unique_section_ids() {
        for industry in Industry::ALL {
            let ids: HashSet<_> = industry.sections().iter().map(|t| t.id).collect();
            assert_eq!(ids.len(), industry.sections().len(), "{industry}");
        }
    }

    #[test]
    fn test_every_industry_starts_with_intro_and_ends_with_reverse() {
        for industry in Industry::ALL {
            let sections = industry.sections();
            assert_eq!(sections.first().map(|t| t.id), Some("intro"));
            assert_eq!(sections.last().map(|t| t.id), Some("reverse"));
        }
    }

    #[test]
    fn test_tech_has_stack_drill() {
        let template = Industry::Tech.template("tech_stack").unwrap();
        assert_eq!(template.block_type, "stack_group");
        assert!(Industry::Finance.template("tech_stack").is_none());
    }

    #[test]
    fn test_from_str_round_trips_display() {
        for industry in Industry::ALL {
            assert_eq!(industry.to_string().parse::<Industry>().unwrap(), industry);
        }
        assert_eq!(" healthcare ".parse::<Industry>().unwrap(), Industry::Healthcare);
        assert!("Aerospace".parse::<Industry>().is_err());
    }

    #[test]
    fn test_serde_uses_variant_names() {
        let industry: Industry = serde_json::from_str(r#""Consulting""#).unwrap();
        assert_eq!(industry, Industry::Consulting);
    }
}
