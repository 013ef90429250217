use shared_types::{AppError, BailEvent, CaseRecord, Lifecycle};
use sqlx::SqlitePool;

use crate::auth::jwt::Claims;
use crate::error_convert::SqlxErrorExt;
use crate::repo::case::{self, StatusUpdate};
use crate::repo::case_event::{self, NewCaseEvent};

/// The caller must be the party the event belongs to on this very case.
fn ensure_party(record: &CaseRecord, actor: &Claims, event: BailEvent) -> Result<(), AppError> {
    if actor.role != event.actor() {
        return Err(AppError::forbidden(format!(
            "Only a {} can {}",
            event.actor(),
            event.as_str().replace('_', " ")
        )));
    }

    let assigned = match event {
        BailEvent::RaiseBail => record.detainee_username.as_deref(),
        BailEvent::ForwardToJudge => Some(record.lawyer_username.as_str()),
        BailEvent::Accept | BailEvent::Decline => Some(record.judge_username.as_str()),
    };

    if assigned != Some(actor.username.as_str()) {
        return Err(AppError::forbidden(format!(
            "Case {} is not assigned to {}",
            record.case_id, actor.username
        )));
    }
    Ok(())
}

/// Move a case through one lifecycle step.
///
/// Loads the case, checks the caller is its party for `event` and consults
/// the transition table. The write transaction then opens with the guarded
/// status update, so it never holds a stale read snapshot, and appends the
/// audit row. A concurrent writer that got there first turns this call into
/// a 409.
pub async fn transition(
    pool: &SqlitePool,
    lifecycle: Lifecycle,
    case_id: &str,
    event: BailEvent,
    actor: &Claims,
    update: StatusUpdate,
) -> Result<CaseRecord, AppError> {
    let record = case::find_by_case_id(pool, case_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Case {case_id} not found")))?;

    ensure_party(&record, actor, event)?;

    let from = record.status();
    let to = lifecycle.next(from, event).map_err(|e| {
        if from.is_terminal() && !lifecycle.allows_redecision() {
            AppError::conflict(format!("Case {case_id} is already {from}; decisions are final"))
        } else {
            AppError::conflict(e.to_string())
        }
    })?;

    let mut tx = pool.begin().await.map_err(SqlxErrorExt::into_app_error)?;

    let Some(updated) = case::set_status(&mut *tx, case_id, from, to, &update).await? else {
        return Err(AppError::conflict(format!(
            "Case {case_id} was changed by another request; reload and retry"
        )));
    };

    let comments = update.judge_comments.as_deref().unwrap_or_default();
    case_event::insert(
        &mut *tx,
        NewCaseEvent {
            case_id,
            from,
            to,
            event,
            actor_role: actor.role,
            actor_username: &actor.username,
            comments,
        },
    )
    .await?;

    tx.commit().await.map_err(SqlxErrorExt::into_app_error)?;

    tracing::info!(
        case_id,
        event = %event,
        from = %from,
        to = %to,
        actor = %actor.username,
        "bail status changed"
    );
    Ok(updated)
}
