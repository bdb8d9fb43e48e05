#[cfg(test)]
mod tests {
    use crate::schemas::ApiDoc;
    use utoipa::openapi::{PathItemType, RefOr, schema::Schema};
    use utoipa::OpenApi;

    fn object_properties(name: &str) -> Vec<String> {
        let openapi = ApiDoc::openapi();
        let components = openapi.components.as_ref().unwrap();
        match components.schemas.get(name) {
            Some(RefOr::T(Schema::Object(obj))) => obj.properties.keys().cloned().collect(),
            _ => panic!("{} should be an object schema", name),
        }
    }

    #[test]
    fn test_openapi_schema_generation() {
        let openapi = ApiDoc::openapi();

        assert!(openapi.components.is_some());
        let components = openapi.components.as_ref().unwrap();
        for name in [
            "ErrorResponse",
            "HealthResponse",
            "AbsencesResponse",
            "AbsenceMutationRequest",
            "AbsenceMutationResponse",
            "CourseAbsenceSummary",
            "CoursesResponse",
            "ModulesResponse",
            "UserProfile",
        ] {
            assert!(components.schemas.contains_key(name), "missing schema {}", name);
        }

        // Verify that the schema can be serialized to JSON without errors
        assert!(serde_json::to_string(&openapi).is_ok());
    }

    #[test]
    fn test_error_response_schema_structure() {
        let properties = object_properties("ErrorResponse");
        for field in ["error", "code", "success"] {
            assert!(properties.iter().any(|p| p == field), "missing {}", field);
        }
    }

    #[test]
    fn test_mutation_request_uses_camel_case() {
        let properties = object_properties("AbsenceMutationRequest");
        assert!(properties.iter().any(|p| p == "moduleId"));
        assert!(properties.iter().any(|p| p == "action"));
        assert!(!properties.iter().any(|p| p == "module_id"));
    }

    #[test]
    fn test_absence_routes_are_documented() {
        let openapi = ApiDoc::openapi();
        let paths = &openapi.paths.paths;

        let absences = paths.get("/api/v1/absences").expect("absences path");
        assert!(absences.operations.contains_key(&PathItemType::Get));
        let post = absences
            .operations
            .get(&PathItemType::Post)
            .expect("mutation operation");
        for status in ["200", "400", "401", "500"] {
            assert!(post.responses.responses.contains_key(status), "missing {}", status);
        }

        for path in [
            "/health",
            "/api/v1/absences/summary",
            "/api/v1/absences/{module_id}/log",
            "/api/v1/courses",
            "/api/v1/modules",
            "/api/v1/me",
        ] {
            assert!(paths.contains_key(path), "missing path {}", path);
        }
    }

    #[test]
    fn test_error_responses_reference_component_schema() {
        let openapi_json = serde_json::to_string(&ApiDoc::openapi()).unwrap();

        assert!(!openapi_json.contains("crate.schemas.ErrorResponse"));
        assert!(!openapi_json.contains("crate::schemas::ErrorResponse"));
        assert!(openapi_json.contains("#/components/schemas/ErrorResponse"));
    }
}
