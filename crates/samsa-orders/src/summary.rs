//! Human-readable order summary sent to the shop owners.
//!
//! The text uses Telegram's HTML parse mode (`<b>` only). Customer input is
//! interpolated verbatim, as the storefront always has.

use std::fmt::Write as _;

use crate::order::PendingOrder;

const NO_ADDRESS: &str = "Не указан";
const NO_COMMENT: &str = "-";

/// Render the multi-line notification for a freshly issued order.
pub fn render_summary(order: &PendingOrder) -> String {
    let c = &order.customer;

    let mut items_text = String::new();
    for item in &order.items {
        // Writing into a String cannot fail.
        let _ = writeln!(
            items_text,
            "• {} × {} = {}₽",
            item.name,
            format_amount(item.quantity),
            format_amount(item.line_total())
        );
    }

    format!(
        "🧾 <b>Новый заказ #{id}</b>\n\
         📅 {date}\n\n\
         👤 <b>Клиент:</b> {name}\n\
         📞 <b>Телефон:</b> {phone}\n\
         📍 <b>Адрес:</b> {address}\n\
         💬 <b>Комментарий:</b> {comment}\n\n\
         📦 <b>Состав заказа:</b>\n{items_text}\n\
         💰 <b>Итого: {total}₽</b>",
        id = order.order_id,
        date = order.date,
        name = c.name,
        phone = c.phone,
        address = or_placeholder(c.address.as_deref(), NO_ADDRESS),
        comment = or_placeholder(c.comment.as_deref(), NO_COMMENT),
        total = format_amount(order.total),
    )
}

fn or_placeholder<'a>(v: Option<&'a str>, placeholder: &'a str) -> &'a str {
    match v {
        Some(s) if !s.is_empty() => s,
        _ => placeholder,
    }
}

/// Money rendering: `10` for integral values, `7.5` otherwise.
pub fn format_amount(v: f64) -> String {
    match integral(v) {
        Some(i) => i.to_string(),
        None => v.to_string(),
    }
}

/// `Some(i)` when `v` is a whole number exactly representable as `i64`.
pub(crate) fn integral(v: f64) -> Option<i64> {
    // 2^53: beyond this not every integer is representable.
    const MAX_EXACT: f64 = 9_007_199_254_740_992.0;
    if v.is_finite() && v.fract() == 0.0 && v.abs() <= MAX_EXACT {
        Some(v as i64)
    } else {
        None
    }
}
