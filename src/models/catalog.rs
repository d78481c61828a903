//! Canonical option lists for the central-Taiwan fruit belt the service
//! targets. Free-form entries use the 其他 sentinel and must be spelled out
//! by the poster instead.

pub const OTHER_SENTINEL: &str = "其他";

pub const CROPS: &[&str] = &[
    "葡萄", "水梨", "柿子", "草莓", "高接梨", "柑橘", "火龍果", "甜桃",
];

pub const TASKS: &[&str] = &[
    "套袋", "剪枝", "採收", "噴藥", "除草", "搬運", "包裝", "疏果",
];

pub const TIME_WINDOWS: &[&str] = &[
    "08:00 - 17:00 (全天)",
    "08:00 - 12:00 (上午)",
    "13:00 - 17:00 (下午)",
    "06:00 - 10:00 (清晨)",
];

pub const DEFAULT_TIME_WINDOW: &str = "全天";

pub struct District {
    pub name: &'static str,
    pub villages: &'static [&'static str],
}

pub const DISTRICTS: &[District] = &[
    District {
        name: "台中市東勢區",
        villages: &[
            "東勢里", "中嵙里", "玉山里", "廣興里", "上城里", "下城里", "慶東里", "泰昌里",
        ],
    },
    District {
        name: "台中市后里區",
        villages: &[
            "后里里", "廣福里", "仁里里", "義里里", "厚里里", "墩北里", "太平里",
        ],
    },
    District {
        name: "台中市新社區",
        villages: &["新社里", "大南里", "中和里", "月湖里", "復盛里", "協成里"],
    },
    District {
        name: "台中市石岡區",
        villages: &["石岡里", "萬安里", "九房里", "金星里", "龍興里", "土牛里"],
    },
    District {
        name: "台中市和平區",
        villages: &["梨山里", "博愛里", "天輪里", "南勢里"],
    },
    District {
        name: "苗栗縣卓蘭鎮",
        villages: &["老庄里", "新厝里", "中街里", "內灣里", "上新里", "坪林里"],
    },
    District {
        name: "苗栗縣大湖鄉",
        villages: &["大湖村", "富興村", "靜湖村", "明湖村", "栗林村"],
    },
    District {
        name: "南投縣埔里鎮",
        villages: &["埔里里", "清新里", "其它里"],
    },
];

pub fn find_district(name: &str) -> Option<&'static District> {
    DISTRICTS.iter().find(|d| d.name == name)
}
