use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    En,
    Vn,
    Jp,
}

impl Language {
    pub fn from_id(id: i32) -> Self {
        match id {
            2 => Language::Vn,
            3 => Language::Jp,
            _ => Language::En,
        }
    }
}

pub type LabelMap = BTreeMap<i32, &'static str>;

fn to_map(entries: &[(i32, &'static str)]) -> LabelMap {
    entries.iter().copied().collect()
}

pub fn asset_status_labels(language: Language) -> LabelMap {
    match language {
        Language::En => to_map(&[(1, "Available"), (2, "In use"), (3, "Broken"), (4, "Liquidated")]),
        Language::Vn => to_map(&[(1, "Sẵn sàng"), (2, "Đang sử dụng"), (3, "Hỏng"), (4, "Đã thanh lý")]),
        Language::Jp => to_map(&[(1, "利用可能"), (2, "使用中"), (3, "故障"), (4, "廃棄済み")]),
    }
}

pub fn asset_request_status_labels(language: Language) -> LabelMap {
    match language {
        Language::En => to_map(&[
            (1, "Request to borrow"),
            (2, "Request to return"),
            (3, "Borrow accepted"),
            (4, "Return accepted"),
            (5, "Borrow denied"),
            (6, "Return denied"),
        ]),
        Language::Vn => to_map(&[
            (1, "Yêu cầu mượn"),
            (2, "Yêu cầu trả"),
            (3, "Đã duyệt mượn"),
            (4, "Đã duyệt trả"),
            (5, "Từ chối mượn"),
            (6, "Từ chối trả"),
        ]),
        Language::Jp => to_map(&[
            (1, "貸出申請"),
            (2, "返却申請"),
            (3, "貸出承認"),
            (4, "返却承認"),
            (5, "貸出却下"),
            (6, "返却却下"),
        ]),
    }
}

pub fn notification_status_labels(language: Language) -> LabelMap {
    match language {
        Language::En => to_map(&[(1, "Unread"), (2, "Read"), (3, "Seen")]),
        Language::Vn => to_map(&[(1, "Chưa đọc"), (2, "Đã đọc"), (3, "Đã xem")]),
        Language::Jp => to_map(&[(1, "未読"), (2, "既読"), (3, "確認済み")]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_language_falls_back_to_english() {
        assert_eq!(Language::from_id(0), Language::En);
        assert_eq!(Language::from_id(3), Language::Jp);
    }

    #[test]
    fn test_every_language_labels_the_same_keys() {
        for lang in [Language::En, Language::Vn, Language::Jp] {
            let keys: Vec<i32> = asset_request_status_labels(lang).keys().copied().collect();
            assert_eq!(keys, vec![1, 2, 3, 4, 5, 6]);
            assert_eq!(asset_status_labels(lang).len(), 4);
            assert_eq!(notification_status_labels(lang).len(), 3);
        }
    }
}
