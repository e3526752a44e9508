use std::str::FromStr;

use sqlx::Row;

use super::PostgresStore;
use crate::{
    error::Error,
    model::{LPRequest, RequestKind, RequestStatus, UserRequest},
};

impl PostgresStore {
    pub(super) async fn find_user_request(
        &self,
        id: &str,
    ) -> Result<Option<UserRequest>, Error> {
        let row = sqlx::query(
            r#"
            SELECT * FROM "user_request" WHERE "id" = $1
            "#,
        )
        .bind(id)
        .fetch_optional(self.pg())
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let kind: String = row.try_get("kind")?;
        let status: String = row.try_get("status")?;

        Ok(Some(UserRequest {
            id: row.try_get("id")?,
            user: row.try_get("user")?,
            pool: row.try_get("pool")?,
            cycle_index: row.try_get("cycle_index")?,
            kind: RequestKind::from_str(&kind)?,
            amount: row.try_get("amount")?,
            collateral_amount: row.try_get("collateral_amount")?,
            liquidator: row.try_get("liquidator")?,
            status: RequestStatus::from_str(&status)?,
            requested_at: row.try_get("requested_at")?,
            resolved_at: row.try_get("resolved_at")?,
        }))
    }

    pub(super) async fn upsert_user_request(
        &self,
        request: &UserRequest,
    ) -> Result<(), Error> {
        sqlx::query(
            r#"
            INSERT INTO "user_request" (
                "id", "user", "pool", "cycle_index", "kind", "amount",
                "collateral_amount", "liquidator", "status", "requested_at",
                "resolved_at"
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ON CONFLICT ("id") DO UPDATE SET
                "kind" = EXCLUDED."kind",
                "amount" = EXCLUDED."amount",
                "collateral_amount" = EXCLUDED."collateral_amount",
                "liquidator" = EXCLUDED."liquidator",
                "status" = EXCLUDED."status",
                "requested_at" = EXCLUDED."requested_at",
                "resolved_at" = EXCLUDED."resolved_at"
            "#,
        )
        .bind(&request.id)
        .bind(&request.user)
        .bind(&request.pool)
        .bind(request.cycle_index)
        .bind(request.kind.as_str())
        .bind(&request.amount)
        .bind(&request.collateral_amount)
        .bind(&request.liquidator)
        .bind(request.status.as_str())
        .bind(request.requested_at)
        .bind(request.resolved_at)
        .execute(self.pg())
        .await?;

        Ok(())
    }

    pub(super) async fn find_lp_request(
        &self,
        id: &str,
    ) -> Result<Option<LPRequest>, Error> {
        let row = sqlx::query(
            r#"
            SELECT * FROM "lp_request" WHERE "id" = $1
            "#,
        )
        .bind(id)
        .fetch_optional(self.pg())
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let kind: String = row.try_get("kind")?;
        let status: String = row.try_get("status")?;

        Ok(Some(LPRequest {
            id: row.try_get("id")?,
            lp: row.try_get("lp")?,
            pool: row.try_get("pool")?,
            cycle_index: row.try_get("cycle_index")?,
            kind: RequestKind::from_str(&kind)?,
            amount: row.try_get("amount")?,
            liquidator: row.try_get("liquidator")?,
            status: RequestStatus::from_str(&status)?,
            requested_at: row.try_get("requested_at")?,
            resolved_at: row.try_get("resolved_at")?,
        }))
    }

    pub(super) async fn upsert_lp_request(
        &self,
        request: &LPRequest,
    ) -> Result<(), Error> {
        sqlx::query(
            r#"
            INSERT INTO "lp_request" (
                "id", "lp", "pool", "cycle_index", "kind", "amount",
                "liquidator", "status", "requested_at", "resolved_at"
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT ("id") DO UPDATE SET
                "kind" = EXCLUDED."kind",
                "amount" = EXCLUDED."amount",
                "liquidator" = EXCLUDED."liquidator",
                "status" = EXCLUDED."status",
                "requested_at" = EXCLUDED."requested_at",
                "resolved_at" = EXCLUDED."resolved_at"
            "#,
        )
        .bind(&request.id)
        .bind(&request.lp)
        .bind(&request.pool)
        .bind(request.cycle_index)
        .bind(request.kind.as_str())
        .bind(&request.amount)
        .bind(&request.liquidator)
        .bind(request.status.as_str())
        .bind(request.requested_at)
        .bind(request.resolved_at)
        .execute(self.pg())
        .await?;

        Ok(())
    }
}
