mod common;

use assert_matches::assert_matches;
use common::TestApp;
use rstest::rstest;
use sea_orm::{EntityTrait, PaginatorTrait};
use shelves_api::{
    entities::binder,
    errors::ServiceError,
    layout::PlacementError,
    services::{AttachmentInput, BinderInput},
};
use uuid::Uuid;

fn binder_input(shelf_id: Uuid, col: Option<i32>, row: Option<i32>) -> BinderInput {
    BinderInput {
        title: "Contracts".into(),
        customer_id: None,
        shelf_id,
        col,
        row,
        content: String::new(),
        color: String::new(),
    }
}

async fn count_binders(app: &TestApp) -> u64 {
    binder::Entity::find().count(&*app.state.db).await.unwrap()
}

#[rstest]
#[case(Some(5), Some(1))]
#[case(Some(5), Some(3))]
#[case(Some(0), Some(1))]
#[case(Some(1), Some(4))]
#[case(Some(-1), Some(2))]
#[tokio::test]
async fn coordinates_outside_the_grid_are_rejected(
    #[case] col: Option<i32>,
    #[case] row: Option<i32>,
) {
    let app = TestApp::new().await;
    let shelf = app.create_shelf("grid", Some(4), Some(3), None).await;

    let result = app
        .state
        .services
        .binders
        .create(app.author, binder_input(shelf.shelf.id, col, row))
        .await;

    assert_matches!(
        result,
        Err(ServiceError::PlacementError(PlacementError::OutOfBounds { cols: 4, rows: 3, .. }))
    );
    assert_eq!(count_binders(&app).await, 0);
}

#[tokio::test]
async fn half_a_coordinate_is_rejected() {
    let app = TestApp::new().await;
    let shelf = app.create_shelf("grid", Some(4), Some(3), None).await;
    let binders = &app.state.services.binders;

    assert_matches!(
        binders
            .create(app.author, binder_input(shelf.shelf.id, Some(2), None))
            .await,
        Err(ServiceError::PlacementError(PlacementError::RowRequired))
    );
    assert_matches!(
        binders
            .create(app.author, binder_input(shelf.shelf.id, None, Some(2)))
            .await,
        Err(ServiceError::PlacementError(PlacementError::ColumnRequired))
    );
}

#[tokio::test]
async fn sequence_shelves_take_no_coordinates() {
    let app = TestApp::new().await;
    let shelf = app.create_shelf("seq", None, None, Some(10)).await;
    let binders = &app.state.services.binders;

    assert_matches!(
        binders
            .create(app.author, binder_input(shelf.shelf.id, Some(1), Some(1)))
            .await,
        Err(ServiceError::PlacementError(PlacementError::NoSize))
    );

    let unplaced = binders
        .create(app.author, binder_input(shelf.shelf.id, None, None))
        .await
        .unwrap();
    assert_eq!(unplaced.col, None);
    assert_eq!(unplaced.row, None);
}

#[tokio::test]
async fn binders_may_share_a_cell() {
    let app = TestApp::new().await;
    let shelf = app.create_shelf("grid", Some(2), Some(2), None).await;
    let binders = &app.state.services.binders;

    for _ in 0..2 {
        binders
            .create(app.author, binder_input(shelf.shelf.id, Some(2), Some(2)))
            .await
            .unwrap();
    }

    assert_eq!(count_binders(&app).await, 2);
}

#[tokio::test]
async fn a_customer_owns_at_most_one_binder() {
    let app = TestApp::new().await;
    let shelf = app.create_shelf("grid", Some(2), Some(2), None).await;
    let customer = app.create_customer("c1", "Anna").await;
    let binders = &app.state.services.binders;

    let mut input = binder_input(shelf.shelf.id, Some(1), Some(1));
    input.customer_id = Some(customer.id);
    let first = binders.create(app.author, input.clone()).await.unwrap();
    assert_eq!(first.customer_id, Some(customer.id));

    assert_matches!(
        binders.create(app.author, input.clone()).await,
        Err(ServiceError::DuplicateError(_))
    );
    assert_eq!(count_binders(&app).await, 1);

    // replacing the owning binder keeps its customer
    input.title = "Contracts 2024".into();
    let updated = binders.update(app.author, first.id, input).await.unwrap();
    assert_eq!(updated.title, "Contracts 2024");
}

#[tokio::test]
async fn references_must_belong_to_the_author() {
    let app = TestApp::new().await;
    let shelf = app.create_shelf("grid", Some(2), Some(2), None).await;
    let customer = app.create_customer("c1", "Anna").await;
    let stranger = Uuid::new_v4();
    let binders = &app.state.services.binders;

    assert_matches!(
        binders
            .create(stranger, binder_input(shelf.shelf.id, None, None))
            .await,
        Err(ServiceError::NotFound(_))
    );

    let other_shelf = app
        .state
        .services
        .shelves
        .create(stranger, common::shelf_input("theirs", None, None, Some(2)))
        .await
        .unwrap();
    let mut input = binder_input(other_shelf.shelf.id, None, None);
    input.customer_id = Some(customer.id);
    assert_matches!(
        binders.create(stranger, input).await,
        Err(ServiceError::NotFound(_))
    );
    assert_eq!(count_binders(&app).await, 0);
}

#[tokio::test]
async fn update_revalidates_placement() {
    let app = TestApp::new().await;
    let shelf = app.create_shelf("grid", Some(3), Some(1), None).await;
    let binders = &app.state.services.binders;

    let created = binders
        .create(app.author, binder_input(shelf.shelf.id, Some(3), Some(1)))
        .await
        .unwrap();

    assert_matches!(
        binders
            .update(app.author, created.id, binder_input(shelf.shelf.id, Some(3), Some(2)))
            .await,
        Err(ServiceError::PlacementError(PlacementError::OutOfBounds { .. }))
    );

    let unchanged = binders.get(app.author, created.id).await.unwrap();
    assert_eq!(unchanged.row, Some(1));
}

#[tokio::test]
async fn invalid_color_is_a_validation_error() {
    let app = TestApp::new().await;
    let shelf = app.create_shelf("grid", Some(1), Some(1), None).await;

    let mut input = binder_input(shelf.shelf.id, None, None);
    input.color = "#zz0000".into();

    assert_matches!(
        app.state.services.binders.create(app.author, input).await,
        Err(ServiceError::ValidationError(_))
    );
}

#[tokio::test]
async fn attachments_follow_their_binder() {
    let app = TestApp::new().await;
    let shelf = app.create_shelf("grid", Some(1), Some(1), None).await;
    let binders = &app.state.services.binders;

    let created = binders
        .create(app.author, binder_input(shelf.shelf.id, None, None))
        .await
        .unwrap();
    let attachment = binders
        .add_attachment(
            app.author,
            created.id,
            AttachmentInput {
                title: "contract".into(),
                file: "attachments/contract.pdf".into(),
            },
        )
        .await
        .unwrap();
    assert_eq!(binders.attachments(app.author, created.id).await.unwrap().len(), 1);

    binders
        .remove_attachment(app.author, created.id, attachment.id)
        .await
        .unwrap();
    assert!(binders.attachments(app.author, created.id).await.unwrap().is_empty());
    assert_matches!(
        binders
            .remove_attachment(app.author, created.id, attachment.id)
            .await,
        Err(ServiceError::NotFound(_))
    );
}

#[tokio::test]
async fn deleting_a_customer_removes_their_binder() {
    let app = TestApp::new().await;
    let shelf = app.create_shelf("grid", Some(1), Some(1), None).await;
    let customer = app.create_customer("c1", "Anna").await;

    let mut input = binder_input(shelf.shelf.id, None, None);
    input.customer_id = Some(customer.id);
    app.state
        .services
        .binders
        .create(app.author, input)
        .await
        .unwrap();

    app.state
        .services
        .customers
        .delete(app.author, customer.id)
        .await
        .unwrap();

    assert_eq!(count_binders(&app).await, 0);
}
