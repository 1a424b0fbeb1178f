use pretty_assertions::assert_eq;
use std::fs;
use std::path::{Path, PathBuf};
use swag_from_source::{
    config::GeneratorConfig,
    error::Error,
    orchestrator::{FileStats, Generator},
};
use tempfile::TempDir;

const ROUTER: &str = include_str!("fixtures/router.go");
const TYPES: &str = include_str!("fixtures/types.go");
const USER_HANDLER: &str = include_str!("fixtures/user_handler.go");
const AUTH_HANDLER: &str = include_str!("fixtures/auth_handler.go");
const PRODUCT_HANDLER: &str = include_str!("fixtures/product_handler.go");
const ORDER_HANDLER: &str = include_str!("fixtures/order_handler.go");

const GET_USER_BLOCK: &str = "\
// GetUser godoc
// @Summary Get User
// @Description Retrieves a single User
// @Tags user
// @Accept json
// @Produce json
// @Param id path integer true \"id\"
// @Param req query types.GetUserReq false \"req\"
// @Success 200 {object} types.Response{data=types.GetUserResp} \"Success\"
// @Failure 400 {object} types.Response \"Bad Request\"
// @Failure 401 {object} types.Response \"Unauthorized\"
// @Failure 500 {object} types.Response \"Internal Server Error\"
// @Security BearerAuth
// @Router /users/{id} [get]
";

const LIST_USERS_BLOCK: &str = "\
// ListUsers godoc
// @Summary List Users
// @Description Retrieves a list of Users
// @Tags user
// @Accept json
// @Produce json
// @Param req query types.ListUsersReq false \"req\"
// @Success 200 {object} types.Response{data=types.ListUsersResp} \"Success\"
// @Failure 400 {object} types.Response \"Bad Request\"
// @Failure 401 {object} types.Response \"Unauthorized\"
// @Failure 500 {object} types.Response \"Internal Server Error\"
// @Security BearerAuth
// @Router /users [get]
";

/// Helper function to create a temporary Go project
fn create_test_project(files: Vec<(&str, &str)>) -> TempDir {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");

    for (path, content) in files {
        let file_path = temp_dir.path().join(path);
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directories");
        }
        fs::write(&file_path, content).expect("Failed to write test file");
    }

    temp_dir
}

fn full_project() -> TempDir {
    create_test_project(vec![
        ("internal/router/router.go", ROUTER),
        ("internal/types/types.go", TYPES),
        ("internal/handler/user_handler.go", USER_HANDLER),
        ("internal/handler/auth_handler.go", AUTH_HANDLER),
        ("internal/handler/product_handler.go", PRODUCT_HANDLER),
        ("internal/handler/order_handler.go", ORDER_HANDLER),
        ("internal/handler/helpers.go", "package handler\n\nfunc (h *UserHandler) audit(c *gin.Context) {}\n"),
    ])
}

fn project_config(root: &Path) -> GeneratorConfig {
    GeneratorConfig {
        handler_dir: root.join("internal/handler"),
        router_file: root.join("internal/router/router.go"),
        type_sources: vec![format!("{}/internal/types/*.go", root.display())],
        workers: 2,
        ..GeneratorConfig::default()
    }
}

fn handler_path(root: &Path, name: &str) -> PathBuf {
    root.join("internal/handler").join(name)
}

fn read(path: &Path) -> String {
    fs::read_to_string(path).expect("Failed to read handler file")
}

fn run_once(config: GeneratorConfig) -> FileStats {
    let generator = Generator::new(config).expect("Failed to create generator");
    let files = generator.discover().expect("Failed to discover handler files");
    let summary = generator.run(&files).expect("Run failed");
    assert_eq!(summary.failed_files, 0);
    summary.total
}

#[test]
fn test_end_to_end_documentation() {
    let project = full_project();
    let root = project.path();

    let total = run_once(project_config(root));

    // helpers.go does not match the handler pattern
    assert_eq!(
        total,
        FileStats {
            total: 11,
            handlers: 9,
            already_documented: 1,
            newly_documented: 8,
        }
    );
    assert_eq!(
        read(&root.join("internal/handler/helpers.go")),
        "package handler\n\nfunc (h *UserHandler) audit(c *gin.Context) {}\n"
    );
}

#[test]
fn test_secured_get_with_path_id() {
    let project = full_project();
    let root = project.path();
    run_once(project_config(root));

    let content = read(&handler_path(root, "user_handler.go"));
    assert!(content.contains(&format!(
        "}}\n\n{}func (h *UserHandler) GetUser(c *gin.Context) {{",
        GET_USER_BLOCK
    )));

    // everything before the handler's original position is untouched
    let original_start = USER_HANDLER.find("func (h *UserHandler) GetUser").unwrap();
    assert_eq!(&content[..original_start], &USER_HANDLER[..original_start]);
}

#[test]
fn test_existing_doc_without_router_is_replaced() {
    let project = full_project();
    let root = project.path();
    run_once(project_config(root));

    let content = read(&handler_path(root, "user_handler.go"));
    assert!(!content.contains("// ListUsers returns every user."));
    assert!(content.contains(&format!(
        "{}func (h *UserHandler) ListUsers(c *gin.Context) {{",
        LIST_USERS_BLOCK
    )));

    // the documented handler keeps its original comment
    assert!(content.contains(
        "// CreateUser godoc\n// @Summary Create User\n// @Router /users [post]\nfunc (h *UserHandler) CreateUser"
    ));
    assert_eq!(content.matches("@Router /users [post]").count(), 1);
}

#[test]
fn test_reflected_and_fallback_path_params() {
    let project = full_project();
    let root = project.path();
    run_once(project_config(root));

    let content = read(&handler_path(root, "user_handler.go"));
    assert!(content.contains(
        "// @Param id path integer true \"id\"\n\
         // @Param order_id path string false \"order_id\"\n\
         // @Param req query types.GetUserOrderReq false \"req\"\n"
    ));
    assert!(content.contains("// @Router /users/{id}/orders/{order_id} [get]\nfunc (h *UserHandler) GetUserOrder"));
}

#[test]
fn test_public_post() {
    let project = full_project();
    let root = project.path();
    run_once(project_config(root));

    let content = read(&handler_path(root, "auth_handler.go"));
    assert!(content.contains("// @Router /login [post]\nfunc (h *AuthHandler) Login"));
    assert!(content.contains("// @Success 201 {object} types.Response{data=types.LoginResp} \"Success\"\n"));
    assert!(content.contains("// @Param req body types.LoginReq true \"req\"\n"));
    assert!(!content.contains("@Security"));
}

#[test]
fn test_list_handler_with_value_receiver() {
    let project = full_project();
    let root = project.path();
    run_once(project_config(root));

    let content = read(&handler_path(root, "order_handler.go"));
    assert!(content.contains("// @Tags order\n"));
    assert!(content.contains(
        "// @Success 200 {object} types.Response{data=types.ListOrdersResp} \"Success\"\n"
    ));
    assert!(content.contains("// @Router /orders [get]\nfunc (h OrderHandler) ListOrders"));
}

#[test]
fn test_multi_handler_file_with_name_fallbacks() {
    let project = full_project();
    let root = project.path();
    run_once(project_config(root));

    let expected = "\
package handler

import \"github.com/gin-gonic/gin\"

type ProductHandler struct{}

// GetProduct godoc
// @Summary Get Product
// @Description Retrieves a single Product
// @Tags product
// @Accept json
// @Produce json
// @Param id path integer true \"id\"
// @Param req query types.GetProductReq false \"req\"
// @Success 200 {object} types.Response{data=types.GetProductResp} \"Success\"
// @Failure 400 {object} types.Response \"Bad Request\"
// @Failure 401 {object} types.Response \"Unauthorized\"
// @Failure 500 {object} types.Response \"Internal Server Error\"
// @Security BearerAuth
// @Router /product/{id} [get]
func (h *ProductHandler) GetProduct(c *gin.Context) {
	c.Status(200)
}

// UpdateProduct godoc
// @Summary Update Product
// @Description Updates an existing Product
// @Tags product
// @Accept json
// @Produce json
// @Param id path integer true \"id\"
// @Param req body types.UpdateProductReq true \"req\"
// @Success 200 {object} types.Response{data=types.UpdateProductResp} \"Success\"
// @Failure 400 {object} types.Response \"Bad Request\"
// @Failure 401 {object} types.Response \"Unauthorized\"
// @Failure 500 {object} types.Response \"Internal Server Error\"
// @Security BearerAuth
// @Router /product/{id} [put]
func (h *ProductHandler) UpdateProduct(c *gin.Context) {
	c.Status(200)
}

// DeleteProduct godoc
// @Summary Delete Product
// @Description Deletes an existing Product
// @Tags product
// @Accept json
// @Produce json
// @Param id path integer true \"id\"
// @Param req body types.DeleteProductReq true \"req\"
// @Success 204 {object} types.Response{data=types.DeleteProductResp} \"Success\"
// @Failure 400 {object} types.Response \"Bad Request\"
// @Failure 401 {object} types.Response \"Unauthorized\"
// @Failure 500 {object} types.Response \"Internal Server Error\"
// @Security BearerAuth
// @Router /product/{id} [delete]
func (h *ProductHandler) DeleteProduct(c *gin.Context) {
	c.Status(204)
}
";
    assert_eq!(read(&handler_path(root, "product_handler.go")), expected);
}

#[test]
fn test_rerun_is_idempotent() {
    let project = full_project();
    let root = project.path();

    let first = run_once(project_config(root));
    let after_first: Vec<String> = ["user_handler.go", "auth_handler.go", "product_handler.go", "order_handler.go"]
        .iter()
        .map(|name| read(&handler_path(root, name)))
        .collect();

    // a fresh generator, as a second invocation of the tool would have
    let second = run_once(project_config(root));
    let after_second: Vec<String> = ["user_handler.go", "auth_handler.go", "product_handler.go", "order_handler.go"]
        .iter()
        .map(|name| read(&handler_path(root, name)))
        .collect();

    assert_eq!(after_first, after_second);
    assert_eq!(second.newly_documented, 0);
    assert_eq!(
        second.already_documented,
        first.already_documented + first.newly_documented
    );
    assert_eq!(second.handlers, first.handlers);
}

#[test]
fn test_rerun_on_same_generator_is_idempotent() {
    let project = full_project();
    let root = project.path();
    let generator = Generator::new(project_config(root)).unwrap();
    let files = generator.discover().unwrap();

    let first = generator.run(&files).unwrap();
    let documented = read(&handler_path(root, "user_handler.go"));
    let products = read(&handler_path(root, "product_handler.go"));

    let second = generator.run(&files).unwrap();
    assert_eq!(read(&handler_path(root, "user_handler.go")), documented);
    assert_eq!(read(&handler_path(root, "product_handler.go")), products);
    assert_eq!(second.failed_files, 0);
    assert_eq!(second.total.newly_documented, 0);
    assert_eq!(
        second.total.already_documented,
        first.total.already_documented + first.total.newly_documented
    );
}

#[test]
fn test_alias_paths_in_one_run_document_once() {
    let project = full_project();
    let root = project.path();
    let generator = Generator::new(project_config(root)).unwrap();
    let path = handler_path(root, "product_handler.go");
    let alias = root.join("internal/./handler/product_handler.go");

    let summary = generator.run(&[path.clone(), alias]).unwrap();

    assert_eq!(summary.files.len(), 1);
    assert_eq!(summary.total.newly_documented, 3);
    let content = read(&path);
    assert_eq!(content.matches("// GetProduct godoc\n").count(), 1);
    assert_eq!(content.matches("@Router").count(), 3);
}

#[test]
fn test_api_prefix() {
    let project = full_project();
    let root = project.path();
    run_once(GeneratorConfig {
        api_prefix: "/api/v1".to_string(),
        ..project_config(root)
    });

    let content = read(&handler_path(root, "user_handler.go"));
    assert!(content.contains("// @Router /api/v1/users/{id} [get]\n"));
    assert!(content.contains("// @Router /api/v1/users [get]\n"));
    let content = read(&handler_path(root, "product_handler.go"));
    assert!(content.contains("// @Router /api/v1/product/{id} [delete]\n"));
}

#[test]
fn test_missing_router_falls_back_to_names() {
    let project = create_test_project(vec![(
        "internal/handler/auth_handler.go",
        AUTH_HANDLER,
    )]);
    let root = project.path();
    run_once(project_config(root));

    // Login is public by name; without the router it is a GET on /login
    let content = read(&handler_path(root, "auth_handler.go"));
    assert!(content.contains("// @Router /login [get]\n"));
    assert!(!content.contains("@Security"));
}

#[test]
fn test_unparseable_file_is_skipped() {
    let broken = "package handler\n\nfunc (h *BrokenHandler) GetBroken(c *gin.Context) {\n";
    let project = create_test_project(vec![
        ("internal/router/router.go", ROUTER),
        ("internal/handler/broken_handler.go", broken),
        ("internal/handler/order_handler.go", ORDER_HANDLER),
    ]);
    let root = project.path();

    let generator = Generator::new(project_config(root)).unwrap();
    let files = generator.discover().unwrap();
    let summary = generator.run(&files).unwrap();

    assert_eq!(summary.failed_files, 1);
    assert_eq!(summary.total.newly_documented, 1);
    let failed = summary.files.iter().find(|r| r.error.is_some()).unwrap();
    assert!(failed.path.ends_with("broken_handler.go"));
    assert_eq!(read(&handler_path(root, "broken_handler.go")), broken);
}

#[test]
fn test_missing_handler_dir_is_terminal() {
    let project = create_test_project(vec![("internal/router/router.go", ROUTER)]);
    let generator = Generator::new(project_config(project.path())).unwrap();

    let err = generator.discover().unwrap_err();
    assert!(matches!(
        err.downcast_ref::<Error>(),
        Some(Error::HandlerDirMissing(_))
    ));
}

#[test]
fn test_dry_run_changes_nothing() {
    let project = full_project();
    let root = project.path();

    let total = run_once(GeneratorConfig {
        dry_run: true,
        ..project_config(root)
    });

    assert_eq!(total.newly_documented, 8);
    assert_eq!(read(&handler_path(root, "user_handler.go")), USER_HANDLER);
    assert_eq!(read(&handler_path(root, "product_handler.go")), PRODUCT_HANDLER);

    let leftovers: Vec<_> = fs::read_dir(root.join("internal/handler"))
        .unwrap()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_name().to_string_lossy().starts_with(".tmp"))
        .collect();
    assert!(leftovers.is_empty());
}

#[test]
fn test_no_temp_files_left_after_run() {
    let project = full_project();
    let root = project.path();
    run_once(project_config(root));

    let mut names: Vec<String> = fs::read_dir(root.join("internal/handler"))
        .unwrap()
        .filter_map(Result::ok)
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    assert_eq!(
        names,
        vec![
            "auth_handler.go",
            "helpers.go",
            "order_handler.go",
            "product_handler.go",
            "user_handler.go",
        ]
    );
}
