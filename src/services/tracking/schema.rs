//! SCORM 1.2 `cmi.*` element schema.
//!
//! The schema is a closed set of entries: concrete element names, and
//! families whose dotted pattern contains `n` placeholders for list indices
//! (`cmi.interactions.n.objectives.n.id`). Lookup tries concrete names first,
//! then families in declaration order.

use super::error_code::ErrorCode;
use chrono::{NaiveTime, TimeDelta};
use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

pub const CMI_CHILDREN: &str =
    "core,suspend_data,launch_data,comments,objectives,student_data,student_preference,interactions";
pub const CORE_CHILDREN: &str = "student_id,student_name,lesson_location,credit,lesson_status,entry,score,total_time,lesson_mode,exit,session_time";
pub const SCORE_CHILDREN: &str = "raw,min,max";
pub const OBJECTIVES_CHILDREN: &str = "id,score,status";
pub const STUDENT_DATA_CHILDREN: &str = "mastery_score,max_time_allowed,time_limit_action";
pub const STUDENT_PREFERENCE_CHILDREN: &str = "audio,language,speed,text";
pub const INTERACTIONS_CHILDREN: &str =
    "id,objectives,time,type,correct_responses,weighting,student_response,result,latency";
pub const DATA_MODEL_VERSION: &str = "3.4";

const KEYWORD_SUFFIXES: [&str; 3] = ["._children", "._count", "._version"];

const LESSON_STATUS: &[&str] = &[
    "passed",
    "completed",
    "failed",
    "incomplete",
    "browsed",
    "not attempted",
];
const EXIT_VOCABULARY: &[&str] = &["time-out", "suspend", "logout", ""];
const INTERACTION_TYPES: &[&str] = &[
    "true-false",
    "choice",
    "fill-in",
    "matching",
    "performance",
    "sequencing",
    "likert",
    "numeric",
];
const INTERACTION_RESULTS: &[&str] = &["correct", "wrong", "unanticipated", "neutral"];

static DECIMAL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^-?(?:\d+(?:\.\d*)?|\.\d+)$").expect("valid decimal regex")
});
static INTEGER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-?\d+$").expect("valid integer regex"));
static TIMESPAN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{2,4}):(\d{2}):(\d{2})(?:\.(\d{1,2}))?$").expect("valid timespan regex")
});
static TIME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{2}):(\d{2}):(\d{2})(?:\.(\d{1,2}))?$").expect("valid time regex")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    ReadOnly,
    WriteOnly,
    ReadWrite,
}

impl Access {
    pub fn readable(self) -> bool {
        !matches!(self, Access::WriteOnly)
    }

    pub fn writable(self) -> bool {
        !matches!(self, Access::ReadOnly)
    }
}

/// Typed view of a wire value that passed its format check.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue<'a> {
    Blank,
    Text(&'a str),
    Token(&'a str),
    Number(f64),
    Duration(TimeDelta),
    TimeOfDay(NaiveTime),
}

/// SCORM 1.2 data types (`CMIString255`, `CMIDecimal`, `CMITimespan`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueFormat {
    String { max_len: usize },
    Identifier,
    Vocabulary(&'static [&'static str]),
    Decimal,
    BlankOrDecimal,
    Integer,
    TimeSpan,
    Time,
    DecimalOrVocabulary(&'static [&'static str]),
}

impl ValueFormat {
    /// Parse `raw`, or `None` if it does not conform.
    pub fn parse<'a>(&self, raw: &'a str) -> Option<FieldValue<'a>> {
        match self {
            ValueFormat::String { max_len } => {
                (raw.chars().count() <= *max_len).then_some(FieldValue::Text(raw))
            }
            ValueFormat::Identifier => {
                let valid = !raw.is_empty()
                    && raw.chars().count() <= 255
                    && !raw.chars().any(char::is_whitespace);
                valid.then_some(FieldValue::Text(raw))
            }
            ValueFormat::Vocabulary(words) => {
                words.iter().any(|w| *w == raw).then_some(FieldValue::Token(raw))
            }
            ValueFormat::Decimal => parse_decimal(raw),
            ValueFormat::BlankOrDecimal => {
                if raw.is_empty() {
                    Some(FieldValue::Blank)
                } else {
                    parse_decimal(raw)
                }
            }
            ValueFormat::Integer => {
                if !INTEGER_RE.is_match(raw) {
                    return None;
                }
                raw.parse::<i64>().ok().map(|n| FieldValue::Number(n as f64))
            }
            ValueFormat::TimeSpan => parse_timespan(raw),
            ValueFormat::Time => parse_time_of_day(raw),
            ValueFormat::DecimalOrVocabulary(words) => {
                if words.iter().any(|w| *w == raw) {
                    Some(FieldValue::Token(raw))
                } else {
                    parse_decimal(raw)
                }
            }
        }
    }
}

fn parse_decimal(raw: &str) -> Option<FieldValue<'_>> {
    if !DECIMAL_RE.is_match(raw) {
        return None;
    }
    raw.parse::<f64>().ok().map(FieldValue::Number)
}

/// Milliseconds from the optional `.S`/`.SS` fraction.
fn fraction_millis(fraction: Option<regex::Match<'_>>) -> i64 {
    match fraction.map(|m| m.as_str()) {
        Some(f) if f.len() == 1 => f.parse::<i64>().unwrap_or(0) * 100,
        Some(f) => f.parse::<i64>().unwrap_or(0) * 10,
        None => 0,
    }
}

fn parse_timespan(raw: &str) -> Option<FieldValue<'_>> {
    let caps = TIMESPAN_RE.captures(raw)?;
    let hours: i64 = caps[1].parse().ok()?;
    let minutes: i64 = caps[2].parse().ok()?;
    let seconds: i64 = caps[3].parse().ok()?;
    if minutes > 59 || seconds > 59 {
        return None;
    }
    let span = TimeDelta::hours(hours)
        + TimeDelta::minutes(minutes)
        + TimeDelta::seconds(seconds)
        + TimeDelta::milliseconds(fraction_millis(caps.get(4)));
    Some(FieldValue::Duration(span))
}

fn parse_time_of_day(raw: &str) -> Option<FieldValue<'_>> {
    let caps = TIME_RE.captures(raw)?;
    let hours: u32 = caps[1].parse().ok()?;
    let minutes: u32 = caps[2].parse().ok()?;
    let seconds: u32 = caps[3].parse().ok()?;
    let millis = u32::try_from(fraction_millis(caps.get(4))).ok()?;
    NaiveTime::from_hms_milli_opt(hours, minutes, seconds, millis).map(FieldValue::TimeOfDay)
}

/// Inclusive numeric bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumericRange {
    pub min: f64,
    pub max: f64,
}

impl NumericRange {
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElementDef {
    pub access: Access,
    pub format: Option<ValueFormat>,
    pub range: Option<NumericRange>,
    /// Reported when a read-only element is set.
    pub write_error: ErrorCode,
    /// Reported when a write-only element is read.
    pub read_error: ErrorCode,
    /// Value reported by `get` while the element has never been stored.
    pub fallback: Option<&'static str>,
}

impl ElementDef {
    fn new(access: Access, format: Option<ValueFormat>) -> Self {
        Self {
            access,
            format,
            range: None,
            write_error: ErrorCode::ReadOnly,
            read_error: ErrorCode::WriteOnly,
            fallback: None,
        }
    }

    pub fn read_only() -> Self {
        Self::new(Access::ReadOnly, None)
    }

    /// `_children`, `_count` and `_version`: derived by the runtime.
    pub fn keyword(fallback: &'static str) -> Self {
        Self {
            write_error: ErrorCode::InvalidSetKeyword,
            fallback: Some(fallback),
            ..Self::new(Access::ReadOnly, None)
        }
    }

    pub fn read_write(format: ValueFormat) -> Self {
        Self::new(Access::ReadWrite, Some(format))
    }

    pub fn write_only(format: ValueFormat) -> Self {
        Self::new(Access::WriteOnly, Some(format))
    }

    pub fn with_range(mut self, min: f64, max: f64) -> Self {
        self.range = Some(NumericRange { min, max });
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment {
    Literal(&'static str),
    Index,
}

pub enum SchemaEntry {
    Concrete {
        name: &'static str,
        def: ElementDef,
    },
    Family {
        pattern: &'static str,
        def: ElementDef,
    },
}

#[derive(Debug)]
struct Family {
    pattern: &'static str,
    segments: Vec<Segment>,
    def: ElementDef,
}

impl Family {
    fn compile(pattern: &'static str, def: ElementDef) -> Self {
        let segments = pattern
            .split('.')
            .map(|s| if s == "n" { Segment::Index } else { Segment::Literal(s) })
            .collect();
        Self {
            pattern,
            segments,
            def,
        }
    }

    fn capture(&self, element: &str) -> Option<Vec<CountUpdate>> {
        let parts: Vec<&str> = element.split('.').collect();
        if parts.len() != self.segments.len() {
            return None;
        }
        let mut counts = Vec::new();
        for (i, (segment, part)) in self.segments.iter().zip(&parts).enumerate() {
            match segment {
                Segment::Literal(lit) if lit == part => {}
                Segment::Literal(_) => return None,
                Segment::Index => {
                    if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                        return None;
                    }
                    let index = part.parse::<usize>().ok()?;
                    counts.push(CountUpdate {
                        count_element: format!("{}._count", parts[..i].join(".")),
                        index,
                    });
                }
            }
        }
        Some(counts)
    }
}

/// `count_element` must become at least `index + 1` after a successful set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountUpdate {
    pub count_element: String,
    pub index: usize,
}

impl CountUpdate {
    /// `index + 1`; `None` when the index is the largest `usize`.
    pub fn required_count(&self) -> Option<usize> {
        self.index.checked_add(1)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Resolved<'s> {
    pub def: &'s ElementDef,
    /// The family pattern that matched, `None` for concrete elements.
    pub pattern: Option<&'static str>,
    /// One entry per index placeholder, outermost list first.
    pub counts: Vec<CountUpdate>,
}

#[derive(Debug)]
pub struct Schema {
    concrete: HashMap<&'static str, ElementDef>,
    families: Vec<Family>,
}

impl Schema {
    pub fn new(entries: Vec<SchemaEntry>) -> Self {
        let mut concrete = HashMap::new();
        let mut families = Vec::new();
        for entry in entries {
            match entry {
                SchemaEntry::Concrete { name, def } => {
                    concrete.insert(name, def);
                }
                SchemaEntry::Family { pattern, def } => {
                    families.push(Family::compile(pattern, def));
                }
            }
        }
        Self { concrete, families }
    }

    pub fn lookup(&self, element: &str) -> Option<Resolved<'_>> {
        if let Some(def) = self.concrete.get(element) {
            return Some(Resolved {
                def,
                pattern: None,
                counts: Vec::new(),
            });
        }
        self.families.iter().find_map(|family| {
            family.capture(element).map(|counts| Resolved {
                def: &family.def,
                pattern: Some(family.pattern),
                counts,
            })
        })
    }

    pub fn contains(&self, element: &str) -> bool {
        self.lookup(element).is_some()
    }

    /// Error for an element with no schema entry: 202 for `._children` on a
    /// known element, 203 for `._count` on a known element or group, 401
    /// otherwise.
    pub fn classify_unknown(&self, element: &str) -> ErrorCode {
        if let Some(parent) = element.strip_suffix("._children") {
            if self.contains(parent) {
                return ErrorCode::ElementCannotHaveChildren;
            }
        }
        if let Some(parent) = element.strip_suffix("._count") {
            if self.contains(parent) || self.is_group(parent) {
                return ErrorCode::ElementNotAnArray;
            }
        }
        ErrorCode::NotImplemented
    }

    /// Groups such as `cmi.core` have no entry of their own, only a
    /// `._children` listing.
    fn is_group(&self, element: &str) -> bool {
        self.contains(&format!("{element}._children"))
    }

    pub fn len(&self) -> usize {
        self.concrete.len() + self.families.len()
    }

    pub fn is_empty(&self) -> bool {
        self.concrete.is_empty() && self.families.is_empty()
    }
}

/// True for the reserved `._children`, `._count` and `._version` elements.
pub fn is_keyword(element: &str) -> bool {
    KEYWORD_SUFFIXES.iter().any(|suffix| element.contains(suffix))
}

fn concrete(name: &'static str, def: ElementDef) -> SchemaEntry {
    SchemaEntry::Concrete { name, def }
}

fn family(pattern: &'static str, def: ElementDef) -> SchemaEntry {
    SchemaEntry::Family { pattern, def }
}

fn scorm12_entries() -> Vec<SchemaEntry> {
    use ElementDef as D;
    use ValueFormat as F;

    let string255 = F::String { max_len: 255 };
    let string4096 = F::String { max_len: 4096 };
    let score = D::read_write(F::BlankOrDecimal).with_range(0.0, 100.0);

    vec![
        concrete("cmi._children", D::keyword(CMI_CHILDREN)),
        concrete("cmi._version", D::keyword(DATA_MODEL_VERSION)),
        concrete("cmi.core._children", D::keyword(CORE_CHILDREN)),
        concrete("cmi.core.student_id", D::read_only()),
        concrete("cmi.core.student_name", D::read_only()),
        concrete("cmi.core.lesson_location", D::read_write(string255)),
        concrete("cmi.core.credit", D::read_only()),
        concrete("cmi.core.lesson_status", D::read_write(F::Vocabulary(LESSON_STATUS))),
        concrete("cmi.core.entry", D::read_only()),
        concrete("cmi.core.score._children", D::keyword(SCORE_CHILDREN)),
        concrete("cmi.core.score.raw", score),
        concrete("cmi.core.score.min", score),
        concrete("cmi.core.score.max", score),
        concrete("cmi.core.total_time", D::read_only()),
        concrete("cmi.core.lesson_mode", D::read_only()),
        concrete("cmi.core.exit", D::write_only(F::Vocabulary(EXIT_VOCABULARY))),
        concrete("cmi.core.session_time", D::write_only(F::TimeSpan)),
        concrete("cmi.suspend_data", D::read_write(string4096)),
        concrete("cmi.launch_data", D::read_only()),
        concrete("cmi.comments", D::read_write(string4096)),
        concrete("cmi.comments_from_lms", D::read_only()),
        concrete("cmi.objectives._children", D::keyword(OBJECTIVES_CHILDREN)),
        concrete("cmi.objectives._count", D::keyword("0")),
        family("cmi.objectives.n.id", D::read_write(F::Identifier)),
        family("cmi.objectives.n.score._children", D::keyword(SCORE_CHILDREN)),
        family("cmi.objectives.n.score.raw", score),
        family("cmi.objectives.n.score.min", score),
        family("cmi.objectives.n.score.max", score),
        family("cmi.objectives.n.status", D::read_write(F::Vocabulary(LESSON_STATUS))),
        concrete("cmi.student_data._children", D::keyword(STUDENT_DATA_CHILDREN)),
        concrete("cmi.student_data.mastery_score", D::read_only()),
        concrete("cmi.student_data.max_time_allowed", D::read_only()),
        concrete("cmi.student_data.time_limit_action", D::read_only()),
        concrete("cmi.student_preference._children", D::keyword(STUDENT_PREFERENCE_CHILDREN)),
        concrete(
            "cmi.student_preference.audio",
            D::read_write(F::Integer).with_range(-1.0, 100.0),
        ),
        concrete("cmi.student_preference.language", D::read_write(string255)),
        concrete(
            "cmi.student_preference.speed",
            D::read_write(F::Integer).with_range(-100.0, 100.0),
        ),
        concrete(
            "cmi.student_preference.text",
            D::read_write(F::Integer).with_range(-1.0, 1.0),
        ),
        concrete("cmi.interactions._children", D::keyword(INTERACTIONS_CHILDREN)),
        concrete("cmi.interactions._count", D::keyword("0")),
        family("cmi.interactions.n.id", D::write_only(F::Identifier)),
        family("cmi.interactions.n.objectives._count", D::keyword("0")),
        family("cmi.interactions.n.objectives.n.id", D::write_only(F::Identifier)),
        family("cmi.interactions.n.time", D::write_only(F::Time)),
        family(
            "cmi.interactions.n.type",
            D::write_only(F::Vocabulary(INTERACTION_TYPES)),
        ),
        family("cmi.interactions.n.correct_responses._count", D::keyword("0")),
        family(
            "cmi.interactions.n.correct_responses.n.pattern",
            D::write_only(string255),
        ),
        family("cmi.interactions.n.weighting", D::write_only(F::Decimal)),
        family("cmi.interactions.n.student_response", D::write_only(string255)),
        family(
            "cmi.interactions.n.result",
            D::write_only(F::DecimalOrVocabulary(INTERACTION_RESULTS)),
        ),
        family("cmi.interactions.n.latency", D::write_only(F::TimeSpan)),
    ]
}

static SCORM12: LazyLock<Schema> = LazyLock::new(|| Schema::new(scorm12_entries()));

/// The SCORM 1.2 run-time data model.
pub fn scorm12() -> &'static Schema {
    &SCORM12
}

#[cfg(test)]
#[path = "tests/schema_tests.rs"]
mod tests;
