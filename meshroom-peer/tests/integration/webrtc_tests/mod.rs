mod test_sessions_connect;
