mod common;

use async_graphql::Variables;
use common::*;
use serde_json::json;

const BOOK: &str = r#"
    mutation Book($gameId: UUID!, $date: NaiveDate!, $slot: String!) {
        bookGameReservation(gameId: $gameId, date: $date, slot: $slot) {
            id
            gameName
            timeSlot
            status
            isActive
            canCancel
        }
    }
"#;

const AVAILABLE: &str = r#"
    query Slots($gameId: UUID!, $date: NaiveDate!) {
        availableSlots(gameId: $gameId, date: $date) { start end label }
    }
"#;

#[tokio::test]
async fn test_book_and_list_own_reservations() {
    let (state, schema) = test_schema();
    let catan = create_test_game(&state, "Catan").await;
    let date = upcoming_date(state.config().campus_offset);
    let (_, user) = test_user("user");

    let vars = json!({ "gameId": catan, "date": date });
    let response = execute_graphql(
        &schema,
        AVAILABLE,
        Some(Variables::from_json(vars.clone())),
        Some(user.clone()),
    )
    .await;
    assert_no_errors(&response);
    let data = response.data.into_json().unwrap();
    assert_eq!(data["availableSlots"].as_array().unwrap().len(), 8);
    assert_eq!(data["availableSlots"][0]["label"], "09:55 - 10:05");

    let response = execute_graphql(
        &schema,
        BOOK,
        Some(Variables::from_json(
            json!({ "gameId": catan, "date": date, "slot": "09:55" }),
        )),
        Some(user.clone()),
    )
    .await;
    assert_no_errors(&response);
    let data = response.data.into_json().unwrap();
    let booked = &data["bookGameReservation"];
    assert_eq!(booked["gameName"], "Catan");
    assert_eq!(booked["timeSlot"], "09:55 - 10:05");
    assert_eq!(booked["status"], "CONFIRMED");
    assert_eq!(booked["isActive"], true);
    assert_eq!(booked["canCancel"], true);

    let response = execute_graphql(
        &schema,
        AVAILABLE,
        Some(Variables::from_json(vars)),
        Some(user.clone()),
    )
    .await;
    assert_no_errors(&response);
    let data = response.data.into_json().unwrap();
    assert_eq!(data["availableSlots"].as_array().unwrap().len(), 7);

    let response = execute_graphql(
        &schema,
        "{ myGameReservations { id gameName isActive canCancel } }",
        None,
        Some(user),
    )
    .await;
    assert_no_errors(&response);
    let data = response.data.into_json().unwrap();
    assert_eq!(data["myGameReservations"].as_array().unwrap().len(), 1);
    assert_eq!(data["myGameReservations"][0]["id"], booked["id"]);
}

#[tokio::test]
async fn test_second_booking_is_a_failed_precondition() {
    let (state, schema) = test_schema();
    let catan = create_test_game(&state, "Catan").await;
    let chess = create_test_game(&state, "Satranç").await;
    let date = upcoming_date(state.config().campus_offset);
    let (_, user) = test_user("user");

    let first = execute_graphql(
        &schema,
        BOOK,
        Some(Variables::from_json(
            json!({ "gameId": catan, "date": date, "slot": "09:55" }),
        )),
        Some(user.clone()),
    )
    .await;
    assert_no_errors(&first);

    let second = execute_graphql(
        &schema,
        BOOK,
        Some(Variables::from_json(
            json!({ "gameId": chess, "date": date, "slot": "10:40" }),
        )),
        Some(user),
    )
    .await;
    assert_eq!(first_error_code(&second).as_deref(), Some("failed-precondition"));
    assert_eq!(
        second.errors[0].message,
        "Zaten aktif bir oyun randevunuz bulunmaktadır."
    );
}

#[tokio::test]
async fn test_invalid_slot_is_an_invalid_argument() {
    let (state, schema) = test_schema();
    let catan = create_test_game(&state, "Catan").await;
    let date = upcoming_date(state.config().campus_offset);
    let (_, user) = test_user("user");

    let response = execute_graphql(
        &schema,
        BOOK,
        Some(Variables::from_json(
            json!({ "gameId": catan, "date": date, "slot": "08:00" }),
        )),
        Some(user),
    )
    .await;
    assert_eq!(first_error_code(&response).as_deref(), Some("invalid-argument"));
}

#[tokio::test]
async fn test_anonymous_caller_is_unauthenticated() {
    let (state, schema) = test_schema();
    let catan = create_test_game(&state, "Catan").await;
    let date = upcoming_date(state.config().campus_offset);

    let response = execute_graphql(
        &schema,
        BOOK,
        Some(Variables::from_json(
            json!({ "gameId": catan, "date": date, "slot": "09:55" }),
        )),
        None,
    )
    .await;
    assert_eq!(first_error_code(&response).as_deref(), Some("unauthenticated"));
}

#[tokio::test]
async fn test_admin_listing_requires_admin_role() {
    let (state, schema) = test_schema();
    let catan = create_test_game(&state, "Catan").await;
    let date = upcoming_date(state.config().campus_offset);
    let (_, user) = test_user("user");
    let (_, teacher) = test_user("teacher");
    let (_, admin) = test_user("admin");

    let booked = execute_graphql(
        &schema,
        BOOK,
        Some(Variables::from_json(
            json!({ "gameId": catan, "date": date, "slot": "12:55" }),
        )),
        Some(user.clone()),
    )
    .await;
    assert_no_errors(&booked);

    let query = r#"
        query List($filter: ReservationFilter) {
            allGameReservations(filter: $filter, sort: ASC, pagination: { limit: 5 }) {
                items { gameName isActive }
                totalCount
                pageSize
                hasNextPage
            }
        }
    "#;

    for claims in [user, teacher] {
        let response = execute_graphql(
            &schema,
            query,
            Some(Variables::from_json(json!({ "filter": "ALL" }))),
            Some(claims),
        )
        .await;
        assert_eq!(first_error_code(&response).as_deref(), Some("permission-denied"));
    }

    let response = execute_graphql(
        &schema,
        query,
        Some(Variables::from_json(json!({ "filter": "ACTIVE" }))),
        Some(admin.clone()),
    )
    .await;
    assert_no_errors(&response);
    let data = response.data.into_json().unwrap();
    let page = &data["allGameReservations"];
    assert_eq!(page["totalCount"], 1);
    assert_eq!(page["pageSize"], 1);
    assert_eq!(page["hasNextPage"], false);
    assert_eq!(page["items"][0]["isActive"], true);

    let response = execute_graphql(
        &schema,
        query,
        Some(Variables::from_json(json!({ "filter": "CANCELLED" }))),
        Some(admin),
    )
    .await;
    assert_no_errors(&response);
    let data = response.data.into_json().unwrap();
    assert_eq!(data["allGameReservations"]["totalCount"], 0);
}

#[tokio::test]
async fn test_bulk_admin_cancellation_and_owner_notification() {
    let (state, schema) = test_schema();
    let catan = create_test_game(&state, "Catan").await;
    let date = upcoming_date(state.config().campus_offset);
    let (_, user) = test_user("user");
    let (_, admin) = test_user("superadmin");

    let booked = execute_graphql(
        &schema,
        BOOK,
        Some(Variables::from_json(
            json!({ "gameId": catan, "date": date, "slot": "15:00" }),
        )),
        Some(user.clone()),
    )
    .await;
    assert_no_errors(&booked);
    let data = booked.data.into_json().unwrap();
    let reservation_id = data["bookGameReservation"]["id"].clone();
    let unknown = uuid::Uuid::new_v4();

    let response = execute_graphql(
        &schema,
        r#"
            mutation Cancel($ids: [UUID!]!) {
                adminCancelReservations(reservationIds: $ids) {
                    reservationId success error code
                }
            }
        "#,
        Some(Variables::from_json(
            json!({ "ids": [reservation_id, unknown] }),
        )),
        Some(admin),
    )
    .await;
    assert_no_errors(&response);
    let data = response.data.into_json().unwrap();
    let outcomes = data["adminCancelReservations"].as_array().unwrap();
    assert_eq!(outcomes[0]["success"], true);
    assert_eq!(outcomes[1]["success"], false);
    assert_eq!(outcomes[1]["code"], "not-found");

    let response = execute_graphql(
        &schema,
        "{ myNotifications { kind title isRead } }",
        None,
        Some(user.clone()),
    )
    .await;
    assert_no_errors(&response);
    let data = response.data.into_json().unwrap();
    let notifications = data["myNotifications"].as_array().unwrap();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0]["kind"], "reservation_cancelled");
    assert_eq!(notifications[0]["isRead"], false);

    let response = execute_graphql(
        &schema,
        "{ myGameReservations { status isActive canCancel } }",
        None,
        Some(user),
    )
    .await;
    assert_no_errors(&response);
    let data = response.data.into_json().unwrap();
    assert_eq!(data["myGameReservations"][0]["status"], "CANCELLED_BY_ADMIN");
    assert_eq!(data["myGameReservations"][0]["isActive"], false);
    assert_eq!(data["myGameReservations"][0]["canCancel"], false);
}

#[tokio::test]
async fn test_game_catalog_is_admin_managed() {
    let (_state, schema) = test_schema();
    let (_, user) = test_user("user");
    let (_, admin) = test_user("admin");

    let create = r#"
        mutation Create($name: String!) {
            createGame(input: { name: $name, description: "4 kişilik" }) { id name }
        }
    "#;

    let response = execute_graphql(
        &schema,
        create,
        Some(Variables::from_json(json!({ "name": "Monopoly" }))),
        Some(user.clone()),
    )
    .await;
    assert_eq!(first_error_code(&response).as_deref(), Some("permission-denied"));

    let response = execute_graphql(
        &schema,
        create,
        Some(Variables::from_json(json!({ "name": "   " }))),
        Some(admin.clone()),
    )
    .await;
    assert_eq!(first_error_code(&response).as_deref(), Some("invalid-argument"));

    let response = execute_graphql(
        &schema,
        create,
        Some(Variables::from_json(json!({ "name": "Monopoly" }))),
        Some(admin.clone()),
    )
    .await;
    assert_no_errors(&response);
    let data = response.data.into_json().unwrap();
    let id = data["createGame"]["id"].clone();

    let response = execute_graphql(&schema, "{ games { name } }", None, Some(user)).await;
    assert_no_errors(&response);
    let data = response.data.into_json().unwrap();
    assert_eq!(data["games"][0]["name"], "Monopoly");

    let delete = r#"mutation Delete($id: UUID!) { deleteGame(id: $id) }"#;
    let response = execute_graphql(
        &schema,
        delete,
        Some(Variables::from_json(json!({ "id": id }))),
        Some(admin.clone()),
    )
    .await;
    assert_no_errors(&response);

    let response = execute_graphql(
        &schema,
        delete,
        Some(Variables::from_json(json!({ "id": id }))),
        Some(admin),
    )
    .await;
    assert_eq!(first_error_code(&response).as_deref(), Some("not-found"));
}

#[tokio::test]
async fn test_reports_are_admin_only_and_typed() {
    let (_state, schema) = test_schema();
    let (_, teacher) = test_user("teacher");
    let (_, admin) = test_user("admin");

    let query = r#"
        query Report($type: String!) {
            generateGlobalReport(reportType: $type)
        }
    "#;

    let response = execute_graphql(
        &schema,
        query,
        Some(Variables::from_json(json!({ "type": "userGrowth" }))),
        Some(teacher),
    )
    .await;
    assert_eq!(first_error_code(&response).as_deref(), Some("permission-denied"));

    let response = execute_graphql(
        &schema,
        query,
        Some(Variables::from_json(json!({ "type": "borrowHeatmap" }))),
        Some(admin),
    )
    .await;
    assert_eq!(first_error_code(&response).as_deref(), Some("not-found"));
}

#[tokio::test]
async fn test_role_assignment_permissions() {
    let (_state, schema) = test_schema();
    let (_, admin) = test_user("admin");
    let (user_id, user) = test_user("user");

    let set_role = r#"
        mutation SetRole($userId: UUID!) {
            setRole(userId: $userId, role: TEACHER) { success message }
        }
    "#;
    let response = execute_graphql(
        &schema,
        set_role,
        Some(Variables::from_json(json!({ "userId": user_id }))),
        Some(admin.clone()),
    )
    .await;
    assert_eq!(first_error_code(&response).as_deref(), Some("permission-denied"));

    let response = execute_graphql(
        &schema,
        r#"mutation { setAdminRole(email: "kimse@okul.edu.tr") { success } }"#,
        None,
        Some(user),
    )
    .await;
    assert_eq!(first_error_code(&response).as_deref(), Some("permission-denied"));

    let response = execute_graphql(
        &schema,
        r#"mutation { setAdminRole(email: "gecersiz") { success } }"#,
        None,
        Some(admin),
    )
    .await;
    assert_eq!(first_error_code(&response).as_deref(), Some("invalid-argument"));
}
