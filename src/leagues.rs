pub const LEAGUE_NAMES: &[(u32, &str)] = &[
    (24646, "英超"),
    (24651, "西甲"),
    (24596, "意甲"),
    (24648, "德甲"),
    (24652, "法甲"),
];

#[derive(Debug, Clone, Copy)]
pub struct LeagueMeta {
    pub id: u32,
    pub cn: &'static str,
    pub full_name: &'static str,
    pub logo: &'static str,
    pub color: &'static str,
    pub bg: &'static str,
    pub gradient: &'static str,
}

const LEAGUE_META: &[LeagueMeta] = &[
    LeagueMeta {
        id: 24646,
        cn: "英超",
        full_name: "英格兰足球超级联赛",
        logo: "/pl.png",
        color: "text-indigo-600",
        bg: "bg-indigo-50",
        gradient: "from-indigo-500 to-purple-600",
    },
    LeagueMeta {
        id: 24651,
        cn: "西甲",
        full_name: "西班牙足球甲级联赛",
        logo: "/laliga.png",
        color: "text-orange-600",
        bg: "bg-orange-50",
        gradient: "from-orange-500 to-red-600",
    },
    LeagueMeta {
        id: 24596,
        cn: "意甲",
        full_name: "意大利足球甲级联赛",
        logo: "/seriea.png",
        color: "text-cyan-600",
        bg: "bg-cyan-50",
        gradient: "from-cyan-500 to-blue-600",
    },
    LeagueMeta {
        id: 24648,
        cn: "德甲",
        full_name: "德国足球甲级联赛",
        logo: "/bundesliga.png",
        color: "text-red-600",
        bg: "bg-red-50",
        gradient: "from-red-500 to-yellow-500",
    },
    LeagueMeta {
        id: 24652,
        cn: "法甲",
        full_name: "法国足球甲级联赛",
        logo: "/ligue1.png",
        color: "text-blue-600",
        bg: "bg-blue-50",
        gradient: "from-blue-500 to-indigo-600",
    },
];

pub fn league_meta(id: u32) -> Option<&'static LeagueMeta> {
    LEAGUE_META.iter().find(|m| m.id == id)
}

pub fn league_name(id: u32) -> &'static str {
    LEAGUE_NAMES
        .iter()
        .find(|(league_id, _)| *league_id == id)
        .map(|(_, name)| *name)
        .unwrap_or("未知联赛")
}
