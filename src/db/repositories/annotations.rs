//! Per-viewer boolean columns computed as correlated `EXISTS` subqueries, so
//! a whole page is annotated in the same statement that loads it.

use sea_orm::sea_query::{Expr, Query, SimpleExpr};

use crate::entities::prelude::*;
use crate::entities::{favorites, recipes, shopping_carts, subscriptions, users};
use crate::models::recipe::RecipeList;

fn always_false() -> SimpleExpr {
    Expr::val(false).into()
}

/// `users.id` is followed by `viewer`.
pub fn is_subscribed(viewer: Option<i32>) -> SimpleExpr {
    let Some(viewer) = viewer else {
        return always_false();
    };

    Expr::exists(
        Query::select()
            .expr(Expr::val(1))
            .from(Subscriptions)
            .and_where(
                Expr::col((Subscriptions, subscriptions::Column::AuthorId))
                    .equals((Users, users::Column::Id)),
            )
            .and_where(Expr::col((Subscriptions, subscriptions::Column::SubscriberId)).eq(viewer))
            .to_owned(),
    )
}

/// `recipes.id` is in `viewer`'s favorites or shopping cart.
pub fn in_recipe_list(list: RecipeList, viewer: Option<i32>) -> SimpleExpr {
    let Some(viewer) = viewer else {
        return always_false();
    };

    let query = match list {
        RecipeList::Favorites => Query::select()
            .expr(Expr::val(1))
            .from(Favorites)
            .and_where(
                Expr::col((Favorites, favorites::Column::RecipeId))
                    .equals((Recipes, recipes::Column::Id)),
            )
            .and_where(Expr::col((Favorites, favorites::Column::UserId)).eq(viewer))
            .to_owned(),
        RecipeList::ShoppingCart => Query::select()
            .expr(Expr::val(1))
            .from(ShoppingCarts)
            .and_where(
                Expr::col((ShoppingCarts, shopping_carts::Column::RecipeId))
                    .equals((Recipes, recipes::Column::Id)),
            )
            .and_where(Expr::col((ShoppingCarts, shopping_carts::Column::UserId)).eq(viewer))
            .to_owned(),
    };

    Expr::exists(query)
}
