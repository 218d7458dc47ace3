/// Question and accepted answer. Answers are compared after normalization.
pub const QUESTIONS: &[(&str, &str)] = &[
    ("What is the capital of Japan?", "tokyo"),
    ("How many sides does a hexagon have?", "6"),
    ("Which planet is known as the Red Planet?", "mars"),
    ("What gas do plants absorb from the air?", "carbon dioxide"),
    ("How many minutes are in three hours?", "180"),
    ("What is the largest ocean on Earth?", "pacific"),
    ("Which element has the chemical symbol O?", "oxygen"),
    ("What is 12 multiplied by 12?", "144"),
    ("What is the hardest natural substance?", "diamond"),
    ("How many continents are there?", "7"),
    ("What is the boiling point of water in Celsius at sea level?", "100"),
    ("Which animal is known as the king of the jungle?", "lion"),
    ("What is the smallest prime number?", "2"),
    ("What colour do you get by mixing blue and yellow?", "green"),
    ("How many legs does a spider have?", "8"),
    ("What is the longest river in Africa?", "nile"),
    ("Which instrument has 88 keys?", "piano"),
    ("What is the square root of 81?", "9"),
    ("What is the freezing point of water in Celsius?", "0"),
    ("Which country is home to the kangaroo?", "australia"),
    ("How many days are in a leap year?", "366"),
    ("What is the main language spoken in Brazil?", "portuguese"),
    ("Which organ pumps blood through the body?", "heart"),
    ("What do bees make?", "honey"),
    ("How many players are on a football (soccer) team on the field?", "11"),
];
