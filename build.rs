use tonic_build::manual::{Builder, Method, Service};

const CODEC: &str = "tonic::codec::ProstCodec";

/// (rust name, route name, input type, output type)
type Rpc = (&'static str, &'static str, &'static str, &'static str);

fn service(package: &str, name: &str, rpcs: &[Rpc]) -> Service {
    rpcs.iter()
        .fold(
            Service::builder().name(name).package(package),
            |builder, (rust_name, route, input, output)| {
                builder.method(
                    Method::builder()
                        .name(*rust_name)
                        .route_name(*route)
                        .input_type(*input)
                        .output_type(*output)
                        .codec_path(CODEC)
                        .build(),
                )
            },
        )
        .build()
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Messages are hand-written prost structs under src/proto; only the
    // service stubs are generated, so no protoc is needed.
    let boxes = service(
        "garage.boxes",
        "BoxesService",
        &[
            ("list_boxes", "ListBoxes", "crate::proto::boxes::ListBoxesRequest", "crate::proto::boxes::ListBoxesResponse"),
            ("get_box", "GetBox", "crate::proto::boxes::GetBoxRequest", "crate::proto::boxes::GetBoxResponse"),
            ("get_box_by_qr_code", "GetBoxByQrCode", "crate::proto::boxes::GetBoxByQrCodeRequest", "crate::proto::boxes::GetBoxResponse"),
            ("create_box", "CreateBox", "crate::proto::boxes::CreateBoxRequest", "crate::proto::boxes::BoxResponse"),
            ("update_box", "UpdateBox", "crate::proto::boxes::UpdateBoxRequest", "crate::proto::boxes::BoxResponse"),
            ("delete_box", "DeleteBox", "crate::proto::boxes::DeleteBoxRequest", "crate::proto::common::DeleteResponse"),
        ],
    );

    let items = service(
        "garage.items",
        "ItemsService",
        &[
            ("list_items", "ListItems", "crate::proto::items::ListItemsRequest", "crate::proto::items::ListItemsResponse"),
            ("get_item", "GetItem", "crate::proto::items::GetItemRequest", "crate::proto::items::GetItemResponse"),
            ("create_item", "CreateItem", "crate::proto::items::CreateItemRequest", "crate::proto::items::ItemResponse"),
            ("update_item", "UpdateItem", "crate::proto::items::UpdateItemRequest", "crate::proto::items::ItemResponse"),
            ("delete_item", "DeleteItem", "crate::proto::items::DeleteItemRequest", "crate::proto::common::DeleteResponse"),
            ("search_by_barcode", "SearchByBarcode", "crate::proto::items::SearchByBarcodeRequest", "crate::proto::items::ListItemsResponse"),
        ],
    );

    let images = service(
        "garage.images",
        "ImagesService",
        &[
            ("list_images", "ListImages", "crate::proto::images::ListImagesRequest", "crate::proto::images::ListImagesResponse"),
            ("upload_image", "UploadImage", "crate::proto::images::UploadImageRequest", "crate::proto::images::ImageResponse"),
            ("delete_image", "DeleteImage", "crate::proto::images::DeleteImageRequest", "crate::proto::common::DeleteResponse"),
            ("upload_box_qr_code", "UploadBoxQrCode", "crate::proto::images::UploadBoxQrCodeRequest", "crate::proto::images::BoxQrCodeResponse"),
            ("get_box_qr_code", "GetBoxQrCode", "crate::proto::images::GetBoxQrCodeRequest", "crate::proto::images::BoxQrCodeResponse"),
        ],
    );

    let search = service(
        "garage.search",
        "SearchService",
        &[
            ("search", "Search", "crate::proto::search::SearchRequest", "crate::proto::search::SearchResponse"),
            ("resolve_scan", "ResolveScan", "crate::proto::search::ResolveScanRequest", "crate::proto::search::ResolveScanResponse"),
            ("list_categories", "ListCategories", "crate::proto::common::Empty", "crate::proto::search::ListCategoriesResponse"),
        ],
    );

    let auth = service(
        "garage.auth",
        "AuthService",
        &[
            ("sign_up", "SignUp", "crate::proto::auth::SignUpRequest", "crate::proto::auth::AuthResponse"),
            ("login", "Login", "crate::proto::auth::LoginRequest", "crate::proto::auth::AuthResponse"),
            ("validate_token", "ValidateToken", "crate::proto::auth::ValidateTokenRequest", "crate::proto::auth::ValidateTokenResponse"),
            ("request_password_reset", "RequestPasswordReset", "crate::proto::auth::RequestPasswordResetRequest", "crate::proto::common::Empty"),
            ("reset_password", "ResetPassword", "crate::proto::auth::ResetPasswordRequest", "crate::proto::common::Empty"),
            ("update_password", "UpdatePassword", "crate::proto::auth::UpdatePasswordRequest", "crate::proto::common::Empty"),
        ],
    );

    let health = Service::builder()
        .name("Health")
        .package("grpc.health.v1")
        .method(
            Method::builder()
                .name("check")
                .route_name("Check")
                .input_type("crate::proto::health::HealthCheckRequest")
                .output_type("crate::proto::health::HealthCheckResponse")
                .codec_path(CODEC)
                .build(),
        )
        .method(
            Method::builder()
                .name("watch")
                .route_name("Watch")
                .input_type("crate::proto::health::HealthCheckRequest")
                .output_type("crate::proto::health::HealthCheckResponse")
                .codec_path(CODEC)
                .server_streaming()
                .build(),
        )
        .build();

    Builder::new()
        .build_server(true)
        .build_client(true)
        .compile(&[boxes, items, images, search, auth, health]);

    println!("cargo:rerun-if-changed=build.rs");

    Ok(())
}
