use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool, Row, postgres::PgRow};
use uuid::Uuid;

use crate::error::AppError;
use crate::utils::flexible_i32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Relation {
    Family,
    Friend,
    Relative,
    Other,
}

impl Relation {
    pub const ALL: [Relation; 4] = [
        Relation::Family,
        Relation::Friend,
        Relation::Relative,
        Relation::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Relation::Family => "family",
            Relation::Friend => "friend",
            Relation::Relative => "relative",
            Relation::Other => "other",
        }
    }
}

impl TryFrom<String> for Relation {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "family" => Ok(Relation::Family),
            "friend" => Ok(Relation::Friend),
            "relative" => Ok(Relation::Relative),
            "other" => Ok(Relation::Other),
            other => Err(format!("unknown relation: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Bride,
    Groom,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Bride => "bride",
            Side::Groom => "groom",
        }
    }
}

impl TryFrom<String> for Side {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "bride" => Ok(Side::Bride),
            "groom" => Ok(Side::Groom),
            other => Err(format!("unknown side: {}", other)),
        }
    }
}

/// 一条宾客记录对应一个受邀单位，可能包含多位随行人员
#[derive(Debug, Clone, Serialize)]
pub struct Guest {
    pub id: Uuid,
    pub name: String,
    /// 规范化后的手机号，同时是回执接口的查询键
    pub phone: String,
    pub relation: Relation,
    pub side: Side,
    pub guest_count: i32,
    pub is_invited: bool,
    pub has_responded: bool,
    pub is_attending: bool,
    pub attending_guest_count: i32,
    pub created_at: DateTime<Utc>,
}

// relation 和 side 在库里存的是文本，解码时转回枚举
impl FromRow<'_, PgRow> for Guest {
    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        let relation: String = row.try_get("relation")?;
        let side: String = row.try_get("side")?;
        Ok(Guest {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            phone: row.try_get("phone")?,
            relation: Relation::try_from(relation).map_err(|e| sqlx::Error::ColumnDecode {
                index: "relation".to_string(),
                source: e.into(),
            })?,
            side: Side::try_from(side).map_err(|e| sqlx::Error::ColumnDecode {
                index: "side".to_string(),
                source: e.into(),
            })?,
            guest_count: row.try_get("guest_count")?,
            is_invited: row.try_get("is_invited")?,
            has_responded: row.try_get("has_responded")?,
            is_attending: row.try_get("is_attending")?,
            attending_guest_count: row.try_get("attending_guest_count")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateGuestRequest {
    pub name: String,
    pub phone: String,
    pub relation: Relation,
    pub side: Side,
    #[serde(deserialize_with = "flexible_i32")]
    pub guest_count: i32,
}

#[derive(Debug, Deserialize)]
pub struct UpdateInvitationRequest {
    pub is_invited: bool,
}

const GUEST_COLUMNS: &str = "id, name, phone, relation, side, guest_count, \
     is_invited, has_responded, is_attending, attending_guest_count, created_at";

impl Guest {
    /// 未受邀的宾客不能提交回执；确认出席的人数不能超过登记名额
    pub fn check_rsvp(&self, is_attending: bool, attending_guest_count: i32) -> Result<(), AppError> {
        if !self.is_invited {
            return Err(AppError::NotInvited);
        }
        if is_attending {
            if attending_guest_count < 1 {
                return Err(AppError::Validation(
                    "出席人数至少为1".to_string(),
                ));
            }
            if attending_guest_count > self.guest_count {
                return Err(AppError::Validation(format!(
                    "出席人数不能超过登记的{}人",
                    self.guest_count
                )));
            }
        }
        Ok(())
    }

    pub async fn create(
        pool: &PgPool,
        req: &CreateGuestRequest,
        phone: &str,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Guest>(&format!(
            "INSERT INTO guests (id, name, phone, relation, side, guest_count) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {GUEST_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(req.name.trim())
        .bind(phone)
        .bind(req.relation.as_str())
        .bind(req.side.as_str())
        .bind(req.guest_count)
        .fetch_one(pool)
        .await
    }

    /// 新登记的宾客排在前面，和管理后台列表的展示顺序一致
    pub async fn list(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Guest>(&format!(
            "SELECT {GUEST_COLUMNS} FROM guests ORDER BY created_at DESC"
        ))
        .fetch_all(pool)
        .await
    }

    pub async fn find_by_phone(pool: &PgPool, phone: &str) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Guest>(&format!(
            "SELECT {GUEST_COLUMNS} FROM guests WHERE phone = $1"
        ))
        .bind(phone)
        .fetch_optional(pool)
        .await
    }

    pub async fn set_invited(
        pool: &PgPool,
        id: Uuid,
        is_invited: bool,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Guest>(&format!(
            "UPDATE guests SET is_invited = $2 WHERE id = $1 RETURNING {GUEST_COLUMNS}"
        ))
        .bind(id)
        .bind(is_invited)
        .fetch_optional(pool)
        .await
    }

    pub async fn record_attendance(
        pool: &PgPool,
        phone: &str,
        is_attending: bool,
        attending_guest_count: i32,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Guest>(&format!(
            "UPDATE guests \
             SET has_responded = TRUE, is_attending = $2, attending_guest_count = $3 \
             WHERE phone = $1 \
             RETURNING {GUEST_COLUMNS}"
        ))
        .bind(phone)
        .bind(is_attending)
        .bind(attending_guest_count)
        .fetch_optional(pool)
        .await
    }

    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM guests WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
