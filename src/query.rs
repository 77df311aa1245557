use serde::{Deserialize, Serialize};

use crate::routes::guest::model::{Guest, Relation, Side};

/// 宾客列表的过滤条件，缺省的字段不参与过滤
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct GuestFilter {
    pub relation: Option<Relation>,
    pub side: Option<Side>,
}

impl GuestFilter {
    pub fn matches(&self, guest: &Guest) -> bool {
        self.relation.is_none_or(|relation| guest.relation == relation)
            && self.side.is_none_or(|side| guest.side == side)
    }
}

/// 按条件过滤宾客，保持输入顺序，空结果是合法的
pub fn filter(guests: Vec<Guest>, criteria: &GuestFilter) -> Vec<Guest> {
    guests
        .into_iter()
        .filter(|guest| criteria.matches(guest))
        .collect()
}

#[derive(Debug, PartialEq, Serialize)]
pub struct RelationCount {
    pub relation: Relation,
    pub count: u32,
}

/// 由宾客集合推导出的统计汇总，字段名与前端消费的JSON保持一致
#[derive(Debug, PartialEq, Serialize)]
pub struct StatisticsSummary {
    pub total: u32,
    pub bride: u32,
    pub groom: u32,
    pub invited: u32,
    /// 已回复且确认出席的宾客组数
    pub attending: u32,
    /// 确认出席的总人数（按组内实际人数累加）
    #[serde(rename = "totalAttendingCount")]
    pub total_attending_count: i64,
    #[serde(rename = "invitedRate")]
    pub invited_rate: f64,
    #[serde(rename = "attendanceRate")]
    pub attendance_rate: f64,
    #[serde(rename = "relationBreakdown")]
    pub relation_breakdown: Vec<RelationCount>,
}

/// 百分比辅助函数，0/0 按 0% 处理
pub fn pct(part: u32, whole: u32) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 * 100.0 / whole as f64
    }
}

/// 对宾客快照做一次遍历，算出全部汇总指标
pub fn summarize(guests: &[Guest]) -> StatisticsSummary {
    let mut bride = 0u32;
    let mut groom = 0u32;
    let mut invited = 0u32;
    let mut attending = 0u32;
    let mut total_attending_count = 0i64;
    let mut relation_counts = [0u32; Relation::ALL.len()];

    for guest in guests {
        match guest.side {
            Side::Bride => bride += 1,
            Side::Groom => groom += 1,
        }
        if guest.is_invited {
            invited += 1;
        }
        // is_attending 只有在已回复时才有意义
        if guest.has_responded && guest.is_attending {
            attending += 1;
            total_attending_count += guest.attending_guest_count as i64;
        }
        let slot = Relation::ALL
            .iter()
            .position(|relation| *relation == guest.relation)
            .unwrap_or(Relation::ALL.len() - 1);
        relation_counts[slot] += 1;
    }

    let total = guests.len() as u32;
    StatisticsSummary {
        total,
        bride,
        groom,
        invited,
        attending,
        total_attending_count,
        invited_rate: pct(invited, total),
        attendance_rate: pct(attending, invited),
        relation_breakdown: Relation::ALL
            .iter()
            .zip(relation_counts)
            .map(|(relation, count)| RelationCount {
                relation: *relation,
                count,
            })
            .collect(),
    }
}
