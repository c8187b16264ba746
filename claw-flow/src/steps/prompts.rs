//! Fixed Thai reply texts.

use crate::catalog::{ProblemCatalog, ProblemDefinition};
use crate::message::{OutboundMessage, QuickReply};
use crate::session::Claim;

use super::validation::{EVIDENCE_PHRASE, NOT_RESOLVED_PHRASE, RESOLVED_PHRASE};

const RESTART_HINT: &str = "พิมพ์ \"เริ่มใหม่\" เพื่อใช้บริการอีกครั้ง";
const CUSTOMER_INFO_EXAMPLE: &str =
    "ชื่อ-นามสกุล, เบอร์โทร, จำนวนเงินที่เสีย\n\nตัวอย่าง:\nสมชาย ใจดี, 081-234-5678, 40 บาท";
const ACCOUNT_EXAMPLE: &str =
    "ธนาคาร, เลขบัญชี, ชื่อบัญชี\n\nตัวอย่าง:\nกสิกรไทย, 123-4-56789-0, นายสมชาย ใจดี";
const EVIDENCE_CHECKLIST: &str = "1. รูปหน้าจอตู้ที่แสดงการหยอดเงิน\n2. วิดีโอการหยอดเงิน (ถ้ามี)\n3. รูปตู้ที่เกิดปัญหา";

fn answer_quick_replies() -> Vec<QuickReply> {
    vec![
        QuickReply::new("แก้ได้ ✅", RESOLVED_PHRASE),
        QuickReply::new("ไม่ได้ ❌", NOT_RESOLVED_PHRASE),
    ]
}

fn answer_hint() -> String {
    format!("กรุณาลองทำตามแล้วตอบว่า \"{RESOLVED_PHRASE}\" หรือ \"{NOT_RESOLVED_PHRASE}\"")
}

pub fn welcome_menu(catalog: &ProblemCatalog) -> OutboundMessage {
    OutboundMessage::text(format!(
        "🎯 สวัสดีครับ! ยินดีต้อนรับสู่ระบบแก้ปัญหาตู้คีบตุ๊กตา\n\nกรุณาเลือกปัญหาที่คุณพบ:\n\n{}\n\nพิมพ์เลข {} เพื่อเลือก",
        catalog.menu_lines(),
        catalog.selection_hint()
    ))
    .with_quick_replies(catalog.quick_replies())
}

pub fn invalid_selection(catalog: &ProblemCatalog) -> OutboundMessage {
    OutboundMessage::text(format!(
        "กรุณาเลือกปัญหาที่ถูกต้อง\nพิมพ์เลข {}:\n\n{}",
        catalog.selection_hint(),
        catalog.menu_lines()
    ))
    .with_quick_replies(catalog.quick_replies())
}

pub fn first_remediation(problem: &ProblemDefinition) -> OutboundMessage {
    OutboundMessage::text(format!(
        "🔧 ปัญหา: {}\n\nขั้นตอนที่ 1: {}\n\n{}",
        problem.display_name,
        problem.remediation_steps[0],
        answer_hint()
    ))
    .with_quick_replies(answer_quick_replies())
}

/// `index` is 0-based; the user sees it 1-based.
pub fn next_remediation(index: usize, instruction: &str) -> OutboundMessage {
    OutboundMessage::text(format!(
        "ขั้นตอนที่ {}: {}\n\n{}",
        index + 1,
        instruction,
        answer_hint()
    ))
    .with_quick_replies(answer_quick_replies())
}

pub fn resolved() -> OutboundMessage {
    OutboundMessage::text(format!(
        "🎉 ยินดีด้วย! ปัญหาได้รับการแก้ไขแล้ว\n\nขอบคุณที่ใช้บริการ หากมีปัญหาอื่น สามารถติดต่อได้ตลอดเวลา\n\n{RESTART_HINT}"
    ))
}

pub fn remediation_exhausted() -> OutboundMessage {
    OutboundMessage::text(
        "😔 ขออภัย ไม่สามารถแก้ปัญหาได้ด้วยวิธีปกติ\n\n📝 ขอเก็บข้อมูลเพื่อดำเนินการโอนเงินคืน + ตุ๊กตาฟรี 1 ตัว\n\n🎯 กรุณาใส่หมายเลขตู้ (เช่น A001, B052)",
    )
}

pub fn answer_only() -> OutboundMessage {
    OutboundMessage::text(format!(
        "กรุณาตอบ \"{RESOLVED_PHRASE}\" หรือ \"{NOT_RESOLVED_PHRASE}\" เท่านั้น"
    ))
    .with_quick_replies(answer_quick_replies())
}

pub fn invalid_machine_number() -> OutboundMessage {
    OutboundMessage::text(
        "❌ รูปแบบหมายเลขตู้ไม่ถูกต้อง\n\nกรุณาใส่หมายเลขตู้ที่ติดอยู่บนตู้ (เช่น A001, B052, C123)",
    )
}

pub fn ask_location(machine_number: &str) -> OutboundMessage {
    OutboundMessage::text(format!(
        "✅ หมายเลขตู้: {machine_number}\n\n📍 กรุณาระบุสถานที่ตั้งตู้:\n\n🏪 หากอยู่ในเซเว่น: ระบุชื่อสาขาและรหัสสาขา\n🏢 หากอยู่หน้าเซเว่น: ระบุที่อยู่ร้าน\n🏬 หากอยู่ที่อื่น: ระบุที่อยู่ที่ชัดเจน"
    ))
}

pub fn invalid_location() -> OutboundMessage {
    OutboundMessage::text(
        "❌ ข้อมูลสถานที่ไม่ครบถ้วน\n\nกรุณาระบุสถานที่ที่ชัดเจน เช่น:\n• เซเว่น สาขาสยาม รหัส 00123\n• หน้าเซเว่น ซอยลาดพร้าว 15\n• ห้างสรรพสินค้า ABC ชั้น 3",
    )
}

pub fn ask_customer_info(location: &str) -> OutboundMessage {
    OutboundMessage::text(format!(
        "✅ สถานที่: {location}\n\n👤 กรุณาระบุข้อมูลส่วนตัว:\n\nรูปแบบ: {CUSTOMER_INFO_EXAMPLE}"
    ))
}

pub fn invalid_customer_info() -> OutboundMessage {
    OutboundMessage::text(format!(
        "❌ ข้อมูลไม่ครบถ้วน\n\nกรุณาระบุ:\n{CUSTOMER_INFO_EXAMPLE}"
    ))
}

pub fn ask_evidence(claim: &Claim) -> OutboundMessage {
    OutboundMessage::text(format!(
        "✅ ข้อมูลลูกค้า:\n• ชื่อ: {}\n• เบอร์: {}\n• จำนวนเงิน: {}\n\n📸 กรุณาส่งหลักฐาน:\n\n{EVIDENCE_CHECKLIST}\n\nหากลืมถ่าย กรุณาลองหยอดใหม่และถ่ายหลักฐาน\n\nพิมพ์ \"{EVIDENCE_PHRASE}\" เมื่อส่งครบแล้ว",
        claim.customer_name.as_deref().unwrap_or_default(),
        claim.customer_phone.as_deref().unwrap_or_default(),
        claim.lost_amount.as_deref().unwrap_or_default(),
    ))
    .with_quick_replies(vec![QuickReply::new(EVIDENCE_PHRASE, EVIDENCE_PHRASE)])
}

pub fn evidence_reminder() -> OutboundMessage {
    OutboundMessage::text(format!(
        "📸 กรุณาส่งหลักฐานตามที่ระบุ:\n\n{EVIDENCE_CHECKLIST}\n\nพิมพ์ \"{EVIDENCE_PHRASE}\" เมื่อส่งครบแล้ว"
    ))
    .with_quick_replies(vec![QuickReply::new(EVIDENCE_PHRASE, EVIDENCE_PHRASE)])
}

pub fn ask_account() -> OutboundMessage {
    OutboundMessage::text(format!(
        "✅ ได้รับหลักฐานเรียบร้อย\n\n🏧 ขั้นตอนสุดท้าย: กรุณาส่งเลขบัญชี\n\nรูปแบบ: {ACCOUNT_EXAMPLE}"
    ))
}

pub fn invalid_account() -> OutboundMessage {
    OutboundMessage::text(format!(
        "❌ ข้อมูลบัญชีไม่ครบถ้วน\n\nกรุณาระบุ:\n{ACCOUNT_EXAMPLE}"
    ))
}

pub fn claim_received() -> OutboundMessage {
    OutboundMessage::text(format!(
        "🎉 ข้อมูลครบถ้วนแล้ว!\n\n✅ ข้อมูลได้ถูกส่งไปยังแอดมินเรียบร้อย\n💰 จะดำเนินการโอนเงินคืน + ตุ๊กตาฟรี 1 ตัว\n⏰ ภายใน 24 ชั่วโมง\n\nขอบคุณที่ใช้บริการ! 🙏\n\n{RESTART_HINT}"
    ))
}

/// Sent when a turn cannot be handled at all.
pub fn please_restart() -> OutboundMessage {
    OutboundMessage::text("ขออภัย เกิดข้อผิดพลาด กรุณาเริ่มใหม่")
}
