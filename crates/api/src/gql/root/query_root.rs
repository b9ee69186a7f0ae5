use async_graphql::MergedObject;

use crate::gql::domains::games::GameQuery;
use crate::gql::domains::leaderboards::LeaderboardQuery;
use crate::gql::domains::notifications::NotificationQuery;
use crate::gql::domains::reports::ReportQuery;
use crate::gql::domains::reservations::ReservationQuery;

#[derive(MergedObject, Default)]
pub struct QueryRoot(
    GameQuery,
    LeaderboardQuery,
    NotificationQuery,
    ReportQuery,
    ReservationQuery,
);
