mod common;

use assert_matches::assert_matches;
use common::TestApp;
use sea_orm::{EntityTrait, PaginatorTrait};
use shelves_api::{
    entities::{customer, upload},
    errors::ServiceError,
    import::FormatError,
};

async fn counts(app: &TestApp) -> (u64, u64) {
    let customers = customer::Entity::find().count(&*app.state.db).await.unwrap();
    let uploads = upload::Entity::find().count(&*app.state.db).await.unwrap();
    (customers, uploads)
}

#[tokio::test]
async fn rows_become_customers_and_an_upload_is_recorded() {
    let app = TestApp::new().await;

    let report = app
        .state
        .services
        .imports
        .import(
            app.author,
            "customers.csv",
            b"name,code,note\nAnna Bianchi,c1,\nMarco Neri,c2,second floor\n",
        )
        .await
        .unwrap();

    assert_eq!(report.created, 2);
    assert_eq!(report.existing, 0);
    assert_eq!(report.file_name, "customers.csv");
    assert_eq!(counts(&app).await, (2, 1));

    let marco = app
        .state
        .services
        .customers
        .get_by_code(app.author, "c2")
        .await
        .unwrap();
    assert_eq!(marco.name, "Marco Neri");
    assert_eq!(marco.note, "second floor");

    let uploads = app.state.services.imports.uploads(app.author).await.unwrap();
    assert_eq!(uploads.len(), 1);
    assert_eq!(uploads[0].id, report.upload_id);
    assert_eq!(uploads[0].created_count, 2);
}

#[tokio::test]
async fn file_without_header_is_refused() {
    let app = TestApp::new().await;

    let result = app
        .state
        .services
        .imports
        .import(app.author, "bare.csv", b"A,c1,\nB,c2,\n")
        .await;

    assert_matches!(
        result,
        Err(ServiceError::FormatError(FormatError::MissingHeader))
    );
    assert_eq!(counts(&app).await, (0, 0));
}

#[tokio::test]
async fn missing_column_is_a_format_error() {
    let app = TestApp::new().await;

    let result = app
        .state
        .services
        .imports
        .import(app.author, "partial.csv", b"name,note\nAnna Bianchi,first floor\n")
        .await;

    assert_matches!(
        result,
        Err(ServiceError::FormatError(FormatError::FieldNotPresent { field: "code", .. }))
    );
    assert_eq!(counts(&app).await, (0, 0));
}

#[tokio::test]
async fn repeated_code_aborts_the_whole_import() {
    let app = TestApp::new().await;

    let result = app
        .state
        .services
        .imports
        .import(
            app.author,
            "repeat.csv",
            b"name,code,note\nAnna,c1,\nMarco,c2,\nLuca,c1,\n",
        )
        .await;

    assert_matches!(result, Err(ServiceError::DuplicateError(code)) if code == "c1");
    assert_eq!(counts(&app).await, (0, 0));
}

#[tokio::test]
async fn invalid_row_reports_its_line() {
    let app = TestApp::new().await;

    let result = app
        .state
        .services
        .imports
        .import(app.author, "bad.csv", b"name,code,note\nAnna,c1,\nMarco,not a code,\n")
        .await;

    assert_matches!(result, Err(ServiceError::ValidationError(message)) if message.starts_with("line 3"));
    assert_eq!(counts(&app).await, (0, 0));
}

#[tokio::test]
async fn identical_existing_customer_is_reused() {
    let app = TestApp::new().await;
    app.create_customer("c1", "Anna").await;

    let report = app
        .state
        .services
        .imports
        .import(app.author, "again.csv", b"name,code,note\nAnna,c1,\nMarco,c2,\n")
        .await
        .unwrap();

    assert_eq!(report.created, 1);
    assert_eq!(report.existing, 1);
    assert_eq!(counts(&app).await, (2, 1));
}

#[tokio::test]
async fn conflicting_existing_customer_rolls_back() {
    let app = TestApp::new().await;
    app.create_customer("c1", "Anna").await;

    let result = app
        .state
        .services
        .imports
        .import(app.author, "clash.csv", b"name,code,note\nMarco,c2,\nNot Anna,c1,\n")
        .await;

    assert_matches!(result, Err(ServiceError::DuplicateError(code)) if code == "c1");
    assert_eq!(counts(&app).await, (1, 0));
}

#[tokio::test]
async fn codes_are_scoped_per_author() {
    let app = TestApp::new().await;
    app.create_customer("c1", "Anna").await;

    let other = uuid::Uuid::new_v4();
    let report = app
        .state
        .services
        .imports
        .import(other, "theirs.csv", b"name,code,note\nSomeone Else,c1,\n")
        .await
        .unwrap();

    assert_eq!(report.created, 1);
    assert_eq!(counts(&app).await, (2, 1));
}

#[tokio::test]
async fn localized_headers_and_bom_are_accepted() {
    let app = TestApp::new().await;

    let report = app
        .state
        .services
        .imports
        .import(
            app.author,
            "clienti.csv",
            "\u{feff}codice,nome,nota\nr-01,Mario Rossi,scaffale 2\nr-02,Luigi Verdi,\n".as_bytes(),
        )
        .await
        .unwrap();

    assert_eq!(report.created, 2);
    let mario = app
        .state
        .services
        .customers
        .get_by_code(app.author, "r-01")
        .await
        .unwrap();
    assert_eq!(mario.name, "Mario Rossi");
    assert_eq!(mario.note, "scaffale 2");
}

#[tokio::test]
async fn oversized_upload_is_refused() {
    let app = TestApp::with_config(|cfg| cfg.max_upload_bytes = 32).await;

    let result = app
        .state
        .services
        .imports
        .import(
            app.author,
            "big.csv",
            b"name,code,note\nAnna Bianchi,c1,\nMarco Neri,c2,\n",
        )
        .await;

    assert_matches!(result, Err(ServiceError::PayloadTooLarge(_)));
    assert_eq!(counts(&app).await, (0, 0));
}

#[tokio::test]
async fn customers_without_a_name_are_imported() {
    let app = TestApp::new().await;

    let report = app
        .state
        .services
        .imports
        .import(app.author, "codes.csv", b"name,code,note\n,c1,\n,c2,\n")
        .await
        .unwrap();

    assert_eq!(report.created, 2);
    assert_eq!(counts(&app).await, (2, 1));
    let first = app
        .state
        .services
        .customers
        .get_by_code(app.author, "c1")
        .await
        .unwrap();
    assert_eq!(first.name, "");
}

#[tokio::test]
async fn overlong_name_still_aborts_the_import() {
    let app = TestApp::new().await;
    let long_name = "x".repeat(33);
    let csv = format!("name,code,note\nAnna,c1,\n{},c2,\n", long_name);

    let result = app
        .state
        .services
        .imports
        .import(app.author, "long.csv", csv.as_bytes())
        .await;

    assert_matches!(result, Err(ServiceError::ValidationError(message)) if message.starts_with("line 3"));
    assert_eq!(counts(&app).await, (0, 0));
}
