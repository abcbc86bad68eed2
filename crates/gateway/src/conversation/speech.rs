//! Spoken replies.

pub const CARD_TRACKING: &str = "tracking";
pub const CARD_ALL_TRACKING: &str = "All tracking";
pub const CARD_GREETING: &str = "Greeting";
pub const CARD_TRACKING_HELP: &str = "Help for Tracking";
pub const CARD_HELP: &str = "Help";
pub const CARD_UNKNOWN_REQUEST: &str = "No Body Type Catch";

pub const MISHEARD_NUMBER: &str = "ごめんなさい、番号聞き取れなかった、もう一度お願いします。";
pub const NOT_UNDERSTOOD: &str = "すみません、よくわかりません、もう一度お願いします。";
pub const DELIVERED: &str = "もう配達完了しました！";
pub const ASK_ALIAS: &str = "よろしければこの追跡内容を教えていただけませんか？";
pub const NOT_REGISTERED: &str = "伝票番号は未登録です。反映まで少々待ちください。";
pub const ALIAS_SAVED: &str = "設定しました！";
pub const NO_TRACKING_IN_SESSION: &str = "追跡番号まだわからないです。";
pub const WRITE_FAILED: &str =
    "すみません、ただいま記録できませんでした。しばらくしてからもう一度お願いします。";
pub const TRACKING_HELP: &str = "追跡サービスです";
pub const HELP: &str =
    "宅配こです。追跡番号を教えていただければ、荷物の状況をお調べします。すべての荷物を確認することもできます。";
pub const STATUS_UNAVAILABLE: &str = "確認できませんでした";

/// Read a number digit by digit: `"120"` -> `"一、二、ゼロ、"`.
/// Characters other than ASCII digits are dropped.
pub fn spoken_digits(number: &str) -> String {
    number
        .chars()
        .filter_map(|c| match c {
            '1' => Some("一"),
            '2' => Some("二"),
            '3' => Some("三"),
            '4' => Some("四"),
            '5' => Some("五"),
            '6' => Some("六"),
            '7' => Some("七"),
            '8' => Some("八"),
            '9' => Some("九"),
            '0' => Some("ゼロ"),
            _ => None,
        })
        .map(|d| format!("{d}、"))
        .collect()
}

pub fn current_status(status: &str) -> String {
    format!("ただいまの状態は{status}です。")
}

pub fn in_transit(status: &str) -> String {
    format!("{}{ASK_ALIAS}", current_status(status))
}

pub fn not_registered() -> String {
    format!("{NOT_REGISTERED}{ASK_ALIAS}")
}

pub fn invalid_number(number: &str) -> String {
    format!(
        "すみません、この伝票番号誤ります。番号は、{}間違いないでしょうか？",
        spoken_digits(number)
    )
}

pub fn list_header(count: usize) -> String {
    format!("ただいまの荷物は{count}個です。\n")
}

/// One list-all line; `position` is 1-based.
pub fn list_line(position: usize, carrier: &str, name: &str, status: &str) -> String {
    let status = if status.is_empty() {
        STATUS_UNAVAILABLE
    } else {
        status
    };
    format!("{position}、{carrier}の、{name}、の荷物状況は、{status}。\n")
}

pub fn unknown_request(request_type: &str) -> String {
    format!("{request_type} is not setting")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digits_are_read_one_by_one() {
        assert_eq!(spoken_digits("1200"), "一、二、ゼロ、ゼロ、");
        assert_eq!(spoken_digits(""), "");
        assert_eq!(spoken_digits("9-8"), "九、八、");
    }

    #[test]
    fn list_line_format() {
        assert_eq!(
            list_line(2, "yamato", "Mom's gift", "配達中"),
            "2、yamatoの、Mom's gift、の荷物状況は、配達中。\n"
        );
    }

    #[test]
    fn list_line_without_status() {
        assert!(list_line(1, "yamato", "一、", "").contains(STATUS_UNAVAILABLE));
    }

    #[test]
    fn in_transit_mentions_status() {
        let text = in_transit("在途中");
        assert!(text.contains("在途中"));
        assert!(text.ends_with(ASK_ALIAS));
    }
}
