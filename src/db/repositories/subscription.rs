use anyhow::Result;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, JoinType, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, RelationTrait, Set,
    sea_query::{Expr, SimpleExpr},
};

use crate::db::is_unique_violation;
use crate::entities::{prelude::*, subscriptions, users};
use crate::models::{PageRequest, Paged};

use super::user::UserRow;

pub struct SubscriptionRepository {
    conn: DatabaseConnection,
}

impl SubscriptionRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Returns `false` when the subscription already existed.
    pub async fn add(&self, subscriber_id: i32, author_id: i32) -> Result<bool> {
        let result = Subscriptions::insert(subscriptions::ActiveModel {
            subscriber_id: Set(subscriber_id),
            author_id: Set(author_id),
            ..Default::default()
        })
        .exec_without_returning(&self.conn)
        .await;

        match result {
            Ok(_) => Ok(true),
            Err(err) if is_unique_violation(&err) => Ok(false),
            Err(err) => Err(err.into()),
        }
    }

    pub async fn remove(&self, subscriber_id: i32, author_id: i32) -> Result<u64> {
        let result = Subscriptions::delete_many()
            .filter(subscriptions::Column::SubscriberId.eq(subscriber_id))
            .filter(subscriptions::Column::AuthorId.eq(author_id))
            .exec(&self.conn)
            .await?;
        Ok(result.rows_affected)
    }

    /// Authors followed by `subscriber_id`, most recent subscription first.
    pub async fn list_authors(&self, subscriber_id: i32, page: PageRequest) -> Result<Paged<UserRow>> {
        let subscribed: SimpleExpr = Expr::val(true).into();

        let paginator = Users::find()
            .select_only()
            .column(users::Column::Id)
            .column(users::Column::Email)
            .column(users::Column::Username)
            .column(users::Column::FirstName)
            .column(users::Column::LastName)
            .column_as(subscribed, "is_subscribed")
            .join(JoinType::InnerJoin, subscriptions::Relation::Author.def().rev())
            .filter(subscriptions::Column::SubscriberId.eq(subscriber_id))
            .order_by_desc(subscriptions::Column::Id)
            .into_model::<UserRow>()
            .paginate(&self.conn, page.size);

        let total = paginator.num_items().await?;
        let items = paginator.fetch_page(page.index()).await?;

        Ok(Paged { items, total })
    }
}
