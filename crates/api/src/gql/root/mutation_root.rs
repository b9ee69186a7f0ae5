use async_graphql::MergedObject;

use crate::gql::domains::games::GameMutation;
use crate::gql::domains::notifications::NotificationMutation;
use crate::gql::domains::reservations::ReservationMutation;
use crate::gql::domains::users::UserMutation;

#[derive(MergedObject, Default)]
pub struct MutationRoot(
    GameMutation,
    NotificationMutation,
    ReservationMutation,
    UserMutation,
);
