mod test_chat_received;
