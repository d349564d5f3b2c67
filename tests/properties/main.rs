mod query_properties;
