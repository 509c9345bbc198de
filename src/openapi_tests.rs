#[cfg(test)]
mod tests {
    use crate::schemas::ApiDoc;
    use utoipa::openapi::schema::Schema;
    use utoipa::openapi::{PathItemType, RefOr};
    use utoipa::OpenApi;

    fn object_properties(name: &str) -> Vec<String> {
        let openapi = ApiDoc::openapi();
        let components = openapi.components.expect("components");
        match components.schemas.get(name) {
            Some(RefOr::T(Schema::Object(obj))) => obj.properties.keys().cloned().collect(),
            _ => panic!("{name} should be an object schema"),
        }
    }

    #[test]
    fn test_openapi_schema_generation() {
        let openapi = ApiDoc::openapi();

        let components = openapi.components.as_ref().unwrap();
        for name in [
            "ErrorResponse",
            "HealthResponse",
            "UserResponse",
            "CourseResponse",
            "BranchResponse",
            "ProfileResponse",
            "StudyGroupResponse",
        ] {
            assert!(components.schemas.contains_key(name), "missing schema {name}");
        }

        assert!(serde_json::to_string(&openapi).is_ok());
    }

    #[test]
    fn test_error_response_schema_structure() {
        let properties = object_properties("ErrorResponse");
        for field in ["error", "code", "success"] {
            assert!(properties.iter().any(|p| p == field));
        }
    }

    #[test]
    fn test_user_response_never_documents_password() {
        let properties = object_properties("UserResponse");
        assert!(properties.iter().any(|p| p == "phone"));
        assert!(properties.iter().any(|p| p == "is_admin"));
        assert!(!properties.iter().any(|p| p == "password"));
    }

    #[test]
    fn test_openapi_paths_cover_every_resource() {
        let openapi = ApiDoc::openapi();
        let paths = &openapi.paths.paths;

        for path in [
            "/health",
            "/api/v1/users",
            "/api/v1/users/{user_id}",
            "/api/v1/auth/login",
            "/api/v1/courses/{course_id}",
            "/api/v1/branches/{branch_id}",
            "/api/v1/teachers/{teacher_id}/branches/{branch_id}",
            "/api/v1/students/{student_id}/study-groups/{study_group_id}",
            "/api/v1/study-groups/{study_group_id}/teachers/{teacher_id}",
        ] {
            assert!(paths.contains_key(path), "missing path {path}");
        }

        let course = paths.get("/api/v1/courses/{course_id}").unwrap();
        let delete = course.operations.get(&PathItemType::Delete).unwrap();
        assert!(delete.responses.responses.contains_key("409"));
    }
}
