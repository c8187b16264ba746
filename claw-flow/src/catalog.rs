//! Static problem catalog: the fault categories a user can pick from and the
//! remediation script attached to each one.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{FlowError, Result};
use crate::message::QuickReply;

/// One fault category with its ordered remediation script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProblemDefinition {
    pub id: String,
    /// Full name, shown in the troubleshooting header and recorded on claims.
    pub display_name: String,
    /// Shorter name used in the selection menu.
    pub menu_label: String,
    pub remediation_steps: Vec<String>,
}

impl ProblemDefinition {
    pub fn new(
        id: impl Into<String>,
        display_name: impl Into<String>,
        remediation_steps: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        let display_name = display_name.into();
        Self {
            id: id.into(),
            menu_label: display_name.clone(),
            display_name,
            remediation_steps: remediation_steps.into_iter().map(Into::into).collect(),
        }
    }

    pub fn with_menu_label(mut self, menu_label: impl Into<String>) -> Self {
        self.menu_label = menu_label.into();
        self
    }
}

/// Ordered, validated set of problem definitions.
#[derive(Debug, Clone)]
pub struct ProblemCatalog {
    problems: Vec<ProblemDefinition>,
}

impl ProblemCatalog {
    /// Build a catalog, rejecting empty catalogs, duplicate ids and entries
    /// without a remediation script.
    pub fn new(problems: Vec<ProblemDefinition>) -> Result<Self> {
        if problems.is_empty() {
            return Err(FlowError::InvalidCatalog(
                "catalog must contain at least one problem".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for problem in &problems {
            if problem.id.trim().is_empty() {
                return Err(FlowError::InvalidCatalog("problem id is empty".to_string()));
            }
            if !seen.insert(problem.id.as_str()) {
                return Err(FlowError::InvalidCatalog(format!(
                    "duplicate problem id: {}",
                    problem.id
                )));
            }
            if problem.remediation_steps.is_empty() {
                return Err(FlowError::InvalidCatalog(format!(
                    "problem {} has no remediation steps",
                    problem.id
                )));
            }
        }

        Ok(Self { problems })
    }

    /// Exact-match lookup on the catalog key.
    pub fn lookup(&self, problem_id: &str) -> Option<&ProblemDefinition> {
        self.problems.iter().find(|p| p.id == problem_id)
    }

    pub fn problems(&self) -> &[ProblemDefinition] {
        &self.problems
    }

    pub fn len(&self) -> usize {
        self.problems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.problems.is_empty()
    }

    /// Menu body listing every category, one per line.
    pub fn menu_lines(&self) -> String {
        self.problems
            .iter()
            .map(|p| format!("{} {}", menu_marker(&p.id), p.menu_label))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Hint telling the user which keys are accepted, e.g. `1-5`.
    pub fn selection_hint(&self) -> String {
        match (self.problems.first(), self.problems.last()) {
            (Some(first), Some(last)) if self.problems.len() > 1 => {
                format!("{}-{}", first.id, last.id)
            }
            (Some(only), _) => only.id.clone(),
            _ => String::new(),
        }
    }

    /// One quick reply per category, submitting the catalog key. Only the
    /// first [`MAX_QUICK_REPLY_ITEMS`] categories get a button; the menu text
    /// still lists all of them.
    pub fn quick_replies(&self) -> Vec<QuickReply> {
        self.problems
            .iter()
            .take(MAX_QUICK_REPLY_ITEMS)
            .map(|p| QuickReply::new(quick_reply_label(p), p.id.clone()))
            .collect()
    }
}

impl Default for ProblemCatalog {
    fn default() -> Self {
        Self {
            problems: default_problems(),
        }
    }
}

/// LINE rejects a message carrying more quick reply items than this.
pub const MAX_QUICK_REPLY_ITEMS: usize = 13;

// LINE caps quick reply labels at 20 characters.
const QUICK_REPLY_LABEL_MAX_CHARS: usize = 20;

fn quick_reply_label(problem: &ProblemDefinition) -> String {
    let label = format!("{}. {}", problem.id, problem.menu_label);
    if label.chars().count() <= QUICK_REPLY_LABEL_MAX_CHARS {
        label
    } else {
        label.chars().take(QUICK_REPLY_LABEL_MAX_CHARS).collect()
    }
}

/// Single ASCII digits render as keycap emoji, anything else as `id.`.
fn menu_marker(id: &str) -> String {
    let mut chars = id.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii_digit() => format!("{c}\u{FE0F}\u{20E3}"),
        _ => format!("{id}."),
    }
}

fn default_problems() -> Vec<ProblemDefinition> {
    vec![
        ProblemDefinition::new(
            "1",
            "ตู้กินเหรียญแล้วไม่ทำงาน",
            [
                "กรุณาลองกดปุ่ม \"Reset\" ที่ด้านข้างตู้ค้างไว้ 5 วินาที",
                "ตรวจสอบหน้าจอว่าแสดงผลปกติหรือไม่",
                "ลองใส่เหรียญอีกครั้งเพื่อทดสอบ",
                "หากยังไม่ได้ กรุณาติดต่อแอดมิน",
            ],
        )
        .with_menu_label("ตู้กินเหรียญไม่ทำงาน"),
        ProblemDefinition::new(
            "2",
            "ตู้ค้างเครื่อง",
            [
                "กดปุ่ม \"Reset\" ที่ด้านข้างตู้ค้างไว้ 10 วินาที",
                "รอประมาณ 30 วินาที ให้ตู้รีสตาร์ทเอง",
                "ตรวจสอบว่าหน้าจอกลับมาแสดงผลปกติ",
                "ลองใส่เหรียญทดสอบอีกครั้ง",
            ],
        ),
        ProblemDefinition::new(
            "3",
            "ตู้คีบไม่แข็ง",
            [
                "ลองเล่นอีก 1-2 ครั้ง เพื่อทดสอบ",
                "ตรวจสอบว่าตู้แสดงข้อความ \"แรงคีบปกติ\" หรือไม่",
                "หากยังไม่แข็ง กรุณาติดต่อแอดมิน",
                "จะได้รับการปรับแรงคีบให้",
            ],
        ),
        ProblemDefinition::new(
            "4",
            "ตู้ไม่มีเสียง",
            [
                "ตรวจสอบปุ่มเสียงที่ตู้ว่าเปิดอยู่หรือไม่",
                "ลองกดปุ่ม Volume + ที่ตู้",
                "รีสตาร์ทตู้ด้วยการกดปุ่ม Reset",
                "หากยังไม่มีเสียง กรุณาแจ้งแอดมิน",
            ],
        ),
        ProblemDefinition::new(
            "5",
            "หยอดครบแล้ว ตุ๊กตาไม่ออก",
            [
                "ตรวจสอบว่าคีบจับตุ๊กตาแล้วหรือยัง",
                "ลองเขย่าตู้เบาๆ เพื่อให้ตุ๊กตาตก",
                "ตรวจสอบว่าตุ๊กตาติดอยู่หรือไม่",
                "หากตุ๊กตาไม่ออกจริง กรุณาแจ้งแอดมิน",
            ],
        )
        .with_menu_label("ตุ๊กตาไม่ออก"),
    ]
}
